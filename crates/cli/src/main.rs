use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

mod app;
mod commands;

use app::App;

fn build_cli() -> Command {
    Command::new("ledgersync")
        .version(clap::crate_version!())
        .about("Offline-first transaction ledger with background sync")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("DIR")
                .help("Directory holding config.toml (ledger defaults to DIR/data)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Treat the network as unavailable")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("init").about("Write a default config and create the ledger"))
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(Arg::new("amount").required(true).value_name("AMOUNT").help("Amount, never negative"))
                .arg(Arg::new("category").required(true).value_name("CATEGORY").help("Category label"))
                .arg(
                    Arg::new("kind")
                        .short('k')
                        .long("kind")
                        .value_name("KIND")
                        .value_parser(["income", "expense"])
                        .default_value("expense")
                        .help("Income or expense"),
                )
                .arg(Arg::new("notes").short('n').long("notes").value_name("TEXT").help("Free-form notes"))
                .arg(
                    Arg::new("date")
                        .short('d')
                        .long("date")
                        .value_name("DATE")
                        .help("YYYY-MM-DD or RFC 3339 timestamp (default: now)"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("Show transactions, newest first")
                .arg(
                    Arg::new("kind")
                        .short('k')
                        .long("kind")
                        .value_name("KIND")
                        .value_parser(["all", "income", "expense"])
                        .default_value("all")
                        .help("Which transactions to show"),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .help("Show at most N transactions"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("summary").about("Show totals and spending by category"))
        .subcommand(Command::new("sync").about("Push pending transactions and pull new ones"))
        .subcommand(Command::new("watch").about("Sync now and whenever the network comes back"))
        .subcommand(Command::new("status").about("Show paths, pending work and connectivity"))
}

fn init_logging(app: &App) {
    let level = app.config().app.log_level.to_string();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

async fn run(matches: ArgMatches) -> Result<()> {
    let config_dir = matches.get_one::<PathBuf>("config").cloned();
    let offline = matches.get_flag("offline");
    let app = App::load(config_dir, offline)?;
    init_logging(&app);

    match matches.subcommand() {
        Some(("init", _)) => commands::init(&app),
        Some(("add", sub_matches)) => commands::add(&app, sub_matches).await,
        Some(("list", sub_matches)) => commands::list(&app, sub_matches),
        Some(("summary", _)) => commands::summary(&app),
        Some(("sync", _)) => commands::sync(&app).await,
        Some(("watch", _)) => commands::watch(&app).await,
        Some(("status", _)) => commands::status(&app).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run(build_cli().get_matches()).await
}
