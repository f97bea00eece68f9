//! Subcommand implementations

use crate::app::{App, Monitor};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::ArgMatches;
use console::style;
use ledgersync_core::{
    category_breakdown, history, Decimal, NewTransaction, Transaction, TransactionFilter,
    TransactionKind,
};
use ledgersync_sync_engine::{SyncEngine, SyncEvent, SyncOutcome};
use std::str::FromStr;
use tokio::sync::broadcast::error::RecvError;

/// Writes a default config file and opens the ledger once
pub fn init(app: &App) -> Result<()> {
    let created = app
        .manager()
        .initialize()
        .context("Failed to write default config")?;

    if created {
        println!(
            "{} Config written to {}",
            style("✓").green().bold(),
            app.manager().config_path().display()
        );
    } else {
        println!(
            "Config already exists at {}",
            app.manager().config_path().display()
        );
    }

    let (engine, _) = app.open_engine()?;
    println!(
        "  Ledger: {} ({} transactions)",
        app.data_dir().display(),
        engine.snapshot().transactions.len()
    );
    Ok(())
}

/// Records a new transaction, then syncs unless offline
pub async fn add(app: &App, matches: &ArgMatches) -> Result<()> {
    let amount = matches
        .get_one::<String>("amount")
        .ok_or_else(|| anyhow::anyhow!("Amount is required"))?;
    let category = matches
        .get_one::<String>("category")
        .ok_or_else(|| anyhow::anyhow!("Category is required"))?;
    let kind = matches
        .get_one::<String>("kind")
        .map(|s| TransactionKind::from_str(s))
        .transpose()?
        .unwrap_or(TransactionKind::Expense);

    let mut new = NewTransaction::new(parse_amount(amount)?, category.as_str(), kind);
    if let Some(notes) = matches.get_one::<String>("notes") {
        new = new.with_notes(notes.as_str());
    }
    if let Some(date) = matches.get_one::<String>("date") {
        new = new.occurred_at(parse_date(date)?);
    }

    let (engine, _) = app.open_engine()?;
    let tx = engine
        .add_transaction(new)
        .context("Failed to record transaction")?;

    println!("{} Transaction recorded", style("✓").green().bold());
    print_transaction(&tx);

    if !app.config().sync.sync_on_add {
        return Ok(());
    }
    if app.is_offline() {
        println!("Offline: it will be pushed on the next sync.");
        return Ok(());
    }

    let outcome = run_sync(&engine).await;
    println!("{}", describe_outcome(&outcome));
    Ok(())
}

/// Prints the history, newest first
pub fn list(app: &App, matches: &ArgMatches) -> Result<()> {
    let filter = matches
        .get_one::<String>("kind")
        .map(|s| TransactionFilter::from_str(s))
        .transpose()?
        .unwrap_or_default();
    let limit = matches.get_one::<usize>("limit").copied();

    let (engine, _) = app.open_engine()?;
    let mut items = history(&engine.snapshot().transactions, filter);
    if let Some(limit) = limit {
        items.truncate(limit);
    }

    if matches.get_flag("json") {
        let json = serde_json::to_string_pretty(&items).context("Failed to serialize to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    if items.is_empty() {
        println!("No transactions. Use 'add' to record one.");
        return Ok(());
    }

    println!("\n{} Transactions", style(items.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for tx in &items {
        print_transaction(tx);
    }
    Ok(())
}

/// Prints totals and the expense breakdown
pub fn summary(app: &App) -> Result<()> {
    let (engine, _) = app.open_engine()?;
    let snapshot = engine.snapshot();
    let summary = snapshot.summary();

    println!("\n{}", style("Ledger Summary").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Income:       {}", style(format!("{:.2}", summary.total_income)).green());
    println!("Expenses:     {}", style(format!("{:.2}", summary.total_expenses)).red());
    println!("Balance:      {}", style(format!("{:.2}", summary.balance())).bold());
    println!("Transactions: {}", summary.transaction_count);
    println!("Unsynced:     {}", summary.unsynced_count);

    let breakdown = category_breakdown(&snapshot.transactions, TransactionKind::Expense);
    if !breakdown.is_empty() {
        println!("\n{}", style("Expenses by category").bold());
        for entry in breakdown {
            println!(
                "  {:<16} {:>12.2}  ({} transactions)",
                entry.category, entry.total, entry.count
            );
        }
    }
    Ok(())
}

/// Runs one sync cycle, printing progress as it happens
pub async fn sync(app: &App) -> Result<()> {
    let (engine, _) = app.open_engine()?;
    let outcome = run_sync(&engine).await;
    println!("{}", describe_outcome(&outcome));

    match outcome {
        SyncOutcome::PushFailed { .. } | SyncOutcome::Aborted { .. } => {
            bail!("Sync did not complete")
        }
        _ => Ok(()),
    }
}

/// Syncs now and again on every reconnect until Ctrl-C
pub async fn watch(app: &App) -> Result<()> {
    let (engine, monitor) = app.open_engine()?;
    let mut events = engine.events();
    let poller = monitor.spawn_polling();
    let listener = engine.start();

    println!(
        "Watching {} (Ctrl-C to stop)",
        style(&app.config().remote.base_url).bold()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Missed {} sync events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    listener.shutdown();
    if let Some(poller) = poller {
        poller.abort();
    }
    println!("Stopped.");
    Ok(())
}

/// Shows where things live and how far the ledger has synced
pub async fn status(app: &App) -> Result<()> {
    let (engine, monitor) = app.open_engine()?;
    let snapshot = engine.snapshot();

    println!("\n{}", style("LedgerSync Status").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Config:       {}", app.manager().config_path().display());
    println!("Ledger:       {}", app.data_dir().display());
    println!("Remote:       {}", app.config().remote.base_url);
    println!("Transactions: {}", snapshot.transactions.len());
    println!("Unsynced:     {}", snapshot.unsynced_count());
    if snapshot.has_synced() {
        println!("Last pull:    {}", snapshot.last_sync_time.to_rfc3339());
    } else {
        println!("Last pull:    never");
    }

    let network = match &monitor {
        Monitor::Manual(_) => style("offline (forced)").yellow(),
        Monitor::Probe(probe) => {
            if probe.refresh().await {
                style("online").green()
            } else {
                style("unreachable").red()
            }
        }
    };
    println!("Network:      {}", network);
    Ok(())
}

/// Runs a cycle and prints its events as they arrive
async fn run_sync(engine: &SyncEngine) -> SyncOutcome {
    let mut events = engine.events();
    let cycle = engine.trigger_sync();
    tokio::pin!(cycle);

    let outcome = loop {
        tokio::select! {
            outcome = &mut cycle => break outcome,
            Ok(event) = events.recv() => print_event(&event),
        }
    };

    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    outcome
}

fn print_event(event: &SyncEvent) {
    println!("  {} {}", style("·").dim(), describe_event(event));
}

fn print_transaction(tx: &Transaction) {
    let amount = format_amount(tx);
    let amount = if tx.is_income() {
        style(amount).green()
    } else {
        style(amount).red()
    };
    let marker = if tx.synced {
        style("✓").green()
    } else {
        style("•").yellow()
    };

    println!(
        "{} {}  {:<16} {:>12}  {}",
        marker,
        tx.occurred_at.format("%Y-%m-%d"),
        tx.category,
        amount,
        truncate(tx.id.as_str(), 8)
    );
    if !tx.notes.is_empty() {
        println!("    {}", style(&tx.notes).dim());
    }
}

fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim()).with_context(|| format!("Invalid amount: {}", s))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {} (expected YYYY-MM-DD or RFC 3339)", s))?;
    match date.and_hms_opt(0, 0, 0) {
        Some(midnight) => Ok(midnight.and_utc()),
        None => bail!("Invalid date: {}", s),
    }
}

fn format_amount(tx: &Transaction) -> String {
    let sign = if tx.is_income() { '+' } else { '-' };
    format!("{}{:.2}", sign, tx.amount)
}

fn describe_event(event: &SyncEvent) -> String {
    match event {
        SyncEvent::Started => "Sync started".to_string(),
        SyncEvent::Offline => "Network unavailable, skipping".to_string(),
        SyncEvent::Uploading { count } => format!("Uploading {} transactions", count),
        SyncEvent::UploadRetrying {
            attempt,
            delay,
            error,
        } => format!(
            "Upload attempt {} failed ({}), retrying in {:.1}s",
            attempt,
            error,
            delay.as_secs_f64()
        ),
        SyncEvent::UploadSucceeded { count, attempts } => {
            format!("Uploaded {} transactions ({} attempts)", count, attempts)
        }
        SyncEvent::UploadFailed { attempts, error } => {
            format!("Upload failed after {} attempts: {}", attempts, error)
        }
        SyncEvent::Downloaded { received, added } => {
            format!("Downloaded {} transactions, {} new", received, added)
        }
        SyncEvent::Error { message } => format!("Error: {}", message),
        SyncEvent::Finished => "Sync finished".to_string(),
    }
}

fn describe_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::AlreadyRunning => "A sync is already running".to_string(),
        SyncOutcome::Offline => "Offline: changes are kept locally".to_string(),
        SyncOutcome::PushFailed { attempts, error } => format!(
            "{} Upload failed after {} attempts: {}",
            style("✗").red().bold(),
            attempts,
            error
        ),
        SyncOutcome::Aborted { error } => {
            format!("{} Sync aborted: {}", style("✗").red().bold(), error)
        }
        SyncOutcome::Completed(report) if report.is_clean() => format!(
            "{} Synced: {} pushed, {} new from server",
            style("✓").green().bold(),
            report.pushed,
            report.added
        ),
        SyncOutcome::Completed(report) => {
            let problems: Vec<&str> = report
                .pull_error
                .iter()
                .chain(report.storage_error.iter())
                .map(String::as_str)
                .collect();
            format!(
                "{} Synced with problems: {} pushed, {} new from server ({})",
                style("!").yellow().bold(),
                report.pushed,
                report.added,
                problems.join("; ")
            )
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len).collect();
        format!("{}...", head)
    }
}
