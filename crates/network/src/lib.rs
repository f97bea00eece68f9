//! Network layer for LedgerSync
//!
//! Provides the HTTP client, the remote transaction service the ledger syncs
//! against, and connectivity monitors that tell the sync engine when to run.

mod client;
mod connectivity;
mod error;
mod protocol;
mod remote;

pub use client::{Client, ClientConfig};
pub use connectivity::{ConnectivityMonitor, ManualConnectivity, ProbeConnectivity};
pub use error::{NetworkError, NetworkResult};
pub use protocol::{PushPayload, RemoteRecord, ServerTimestamp};
pub use remote::{HttpRemote, RemoteService};
