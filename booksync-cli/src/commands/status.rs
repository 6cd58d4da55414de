use anyhow::Result;
use booksync_core::snapshot::SnapshotStore;
use owo_colors::OwoColorize;

use crate::config::GlobalConfig;
use crate::utils;

/// Show what the local snapshot currently holds, without touching the API.
pub fn run() -> Result<()> {
    let config = GlobalConfig::load()?;
    let store = SnapshotStore::new(config.output_path());
    let snapshot = store.load();

    match snapshot.last_updated {
        Some(at) => println!("Last synced: {}\n", at.to_rfc3339()),
        None => {
            println!("{}", "No snapshot yet. Run `booksync sync` first.".dimmed());
            return Ok(());
        }
    }

    for (name, group) in snapshot.groups() {
        println!("  - {}: {}", utils::capitalize(name), group.len());
    }

    println!("\nTotal: {} bookings ({})", snapshot.total(), store.path().display());

    Ok(())
}
