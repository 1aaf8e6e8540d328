mod cli;

use clap::Parser;
use cli::{Cli, Commands, HistoryArgs};
use pdfdesk::config::Config;
use pdfdesk::ledger::HistoryLedger;
use pdfdesk::storage::OutputStore;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;

    match cli.command {
        Commands::Server(args) => pdfdesk::api::run(config, args.address).await?,
        Commands::History(args) => print_history(&config, &args)?,
    }

    Ok(())
}

fn print_history(config: &Config, args: &HistoryArgs) -> Result<(), AnyError> {
    let ledger = HistoryLedger::open(&config.ledger)?;
    let store = OutputStore::new(&config.storage);
    let entries = ledger.list()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No operations recorded yet");
        return Ok(());
    }

    for entry in &entries {
        let marker = if store.exists(&entry.filename) { "" } else { " (missing)" };
        println!(
            "{:<26}  {:<14}  {}{}",
            entry.timestamp, entry.action, entry.filename, marker
        );
    }
    Ok(())
}
