use std::time::Duration;

use anyhow::{Context, Result};
use booksync_core::reconcile::{self, ReconcileOptions};
use booksync_core::snapshot::{Snapshot, SnapshotStore};
use chrono::Utc;
use clap::{Args, ValueEnum};
use dialoguer::{Confirm, Input, Select};
use owo_colors::OwoColorize;

use crate::client::DayScheduleClient;
use crate::config::GlobalConfig;
use crate::utils::{self, tui};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyncMode {
    /// Reuse bookings whose status has not changed since the last run
    Incremental,
    /// Ignore the prior snapshot and re-fetch every booking
    Full,
}

#[derive(Args)]
pub struct SyncArgs {
    /// Sync mode
    #[arg(long, value_enum)]
    pub mode: Option<SyncMode>,

    /// Re-fetch bookings even when the prior record looks current
    #[arg(long)]
    pub force: bool,

    /// Only process the first N bookings (for bounded trial runs)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Re-run automatically every N minutes until interrupted
    #[arg(long, value_name = "MINUTES")]
    pub every: Option<u64>,

    /// Max simultaneous detail fetches
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Pause after each detail fetch, in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Prompt for parameters not given as flags
    #[arg(short, long)]
    pub interactive: bool,
}

/// Fully-resolved parameters for a run, after flags and prompts.
struct RunParams {
    mode: SyncMode,
    limit: Option<usize>,
    every: Option<u64>,
    options: ReconcileOptions,
}

pub async fn run(args: SyncArgs) -> Result<()> {
    let config = GlobalConfig::load()?;
    let params = resolve_params(args)?;

    let client = DayScheduleClient::new(&config.base_url, &config.api_key);
    let store = SnapshotStore::new(config.output_path());

    match params.every {
        None => run_once(&client, &store, &params).await,
        Some(minutes) => run_recurring(&client, &store, &params, minutes).await,
    }
}

/// Merge CLI flags with defaults, prompting for anything unset when
/// --interactive was given.
fn resolve_params(args: SyncArgs) -> Result<RunParams> {
    let mode = match args.mode {
        Some(mode) => mode,
        None if args.interactive => {
            let choice = Select::new()
                .with_prompt("Sync mode")
                .items(&["incremental", "full"])
                .default(0)
                .interact()?;
            if choice == 0 {
                SyncMode::Incremental
            } else {
                SyncMode::Full
            }
        }
        None => SyncMode::Incremental,
    };

    let force = if args.force {
        true
    } else if args.interactive {
        Confirm::new()
            .with_prompt("Re-fetch bookings that look current?")
            .default(false)
            .interact()?
    } else {
        false
    };

    let limit = match args.limit {
        Some(n) => Some(n),
        None if args.interactive => {
            let n: usize = Input::new()
                .with_prompt("Only process the first N bookings (0 for all)")
                .default(0)
                .interact_text()?;
            (n > 0).then_some(n)
        }
        None => None,
    };

    let every = match args.every {
        Some(minutes) => Some(minutes),
        None if args.interactive => {
            let minutes: u64 = Input::new()
                .with_prompt("Re-run every N minutes (0 for a single run)")
                .default(0)
                .interact_text()?;
            (minutes > 0).then_some(minutes)
        }
        None => None,
    };

    let mut options = ReconcileOptions {
        force,
        ..Default::default()
    };
    if let Some(cap) = args.concurrency {
        options.concurrency = cap.max(1);
    }
    if let Some(ms) = args.delay_ms {
        options.pacing = Duration::from_millis(ms);
    }

    Ok(RunParams {
        mode,
        limit,
        every,
        options,
    })
}

/// One end-to-end run: list, reconcile, persist, report.
async fn run_once(
    client: &DayScheduleClient,
    store: &SnapshotStore,
    params: &RunParams,
) -> Result<()> {
    let spinner = tui::create_spinner("Fetching booking summaries".to_string());
    let listing = client.list_bookings().await;
    spinner.finish_and_clear();

    let mut summaries = listing?;
    if let Some(limit) = params.limit {
        summaries.truncate(limit);
    }

    println!("{} bookings found.\n", summaries.len());

    // In full mode the prior snapshot is ignored entirely, so every booking
    // is fetched and counted as new.
    let prior = match params.mode {
        SyncMode::Incremental => store.load(),
        SyncMode::Full => Snapshot::default(),
    };

    let bar = tui::create_progress_bar(summaries.len() as u64);
    let outcome = reconcile::reconcile(&summaries, &prior, client, &params.options, |_| {
        bar.inc(1)
    })
    .await;
    bar.finish_and_clear();

    let mut snapshot = outcome.snapshot;
    snapshot.last_updated = Some(Utc::now());

    store.save(&snapshot).context("Failed to write snapshot")?;

    println!("Summary:");
    for (name, group) in snapshot.groups() {
        println!("  - {}: {}", utils::capitalize(name), group.len());
    }

    let tally = outcome.tally;
    println!(
        "\n{} new, {} updated, {} unchanged",
        tally.new.to_string().green(),
        tally.updated.to_string().yellow(),
        tally.unchanged
    );
    println!(
        "\nSynced {} bookings to {}",
        snapshot.total(),
        store.path().display()
    );

    Ok(())
}

/// Ticker for the recurring loop: runs fire on a fixed wall-clock cadence
/// rather than `period` after the previous run finished. A run that overshoots
/// its period skips the missed tick instead of firing back-to-back.
fn sync_ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker
}

/// Re-run on a fixed interval until Ctrl-C. A failed run is reported but
/// does not stop the loop; interruption lands between runs, never mid-run.
async fn run_recurring(
    client: &DayScheduleClient,
    store: &SnapshotStore,
    params: &RunParams,
    minutes: u64,
) -> Result<()> {
    println!("Syncing every {minutes} minute(s). Press Ctrl-C to stop.\n");

    // The first tick fires immediately, so the initial sync starts right away.
    let mut ticker = sync_ticker(Duration::from_secs(minutes * 60));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopped.");
                return Ok(());
            }
            _ = ticker.tick() => {
                if let Err(e) = run_once(client, store, params).await {
                    println!("{}", format!("Sync failed: {e:#}").red());
                }
            }
        }
    }
}
