use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "pdfdesk")]
#[command(about = "pdfdesk PDF utility", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
    /// Print the operation history, newest first
    History(HistoryArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (overrides the configured one)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Emit the ledger as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_address() {
        let cli = Cli::parse_from(["pdfdesk", "server", "--address", "127.0.0.1:9000"]);
        match cli.command {
            Commands::Server(args) => {
                assert_eq!(args.address, Some("127.0.0.1:9000".parse().unwrap()))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_history_json_flag() {
        let cli = Cli::parse_from(["pdfdesk", "history", "--json"]);
        assert!(matches!(cli.command, Commands::History(HistoryArgs { json: true })));
    }
}
