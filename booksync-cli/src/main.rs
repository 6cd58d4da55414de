mod client;
mod commands;
mod config;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "booksync")]
#[command(about = "Sync DaySchedule bookings into a local JSON snapshot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync, or a recurring sync with --every
    Sync(commands::sync::SyncArgs),

    /// Show what the local snapshot currently holds
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync(args) => commands::sync::run(args).await,
        Commands::Status => commands::status::run(),
    }
}
