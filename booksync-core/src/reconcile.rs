//! Incremental reconciliation of listed bookings against the prior snapshot.
//!
//! The engine decides, per listed summary, whether the previously synced
//! record can be reused verbatim or the booking's detail must be re-fetched,
//! then merges the results into a fresh status-grouped snapshot together with
//! a change tally.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::booking::BookingSummary;
use crate::fetch::DetailFetcher;
use crate::normalize::{self, NormalizedBooking};
use crate::snapshot::{BookingIndex, Snapshot};

/// Default cap on simultaneous in-flight detail fetches.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default pause after each completed fetch, to stay under the API rate limit.
pub const DEFAULT_PACING: Duration = Duration::from_millis(300);

/// Summaries are processed in sequential batches of this size.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Knobs for one reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Re-fetch every booking even when the prior record looks current.
    pub force: bool,
    /// Max simultaneous in-flight detail fetches.
    pub concurrency: usize,
    /// Pause applied after each completed fetch. Reused records pay nothing.
    pub pacing: Duration,
    /// How many summaries each sequential batch covers.
    pub batch_size: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            force: false,
            concurrency: DEFAULT_CONCURRENCY,
            pacing: DEFAULT_PACING,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Per-run change tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTally {
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Outcome of one reconciliation run: the grouped bookings (timestamp not yet
/// stamped) and what changed relative to the prior snapshot.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub snapshot: Snapshot,
    pub tally: ChangeTally,
}

enum Planned<'a> {
    Reuse(&'a NormalizedBooking),
    Fetch(&'a BookingSummary),
}

/// Reconcile the current booking summaries against the prior snapshot.
///
/// Batches run strictly one after another; within a batch, fetches run
/// concurrently under a counting admission gate. A booking whose fetch fails
/// is dropped from the output for this run (the fetcher logs the cause).
/// `on_processed` fires once per summary, in summary order, after its batch
/// has fully settled.
pub async fn reconcile<F>(
    summaries: &[BookingSummary],
    prior: &Snapshot,
    fetcher: &dyn DetailFetcher,
    options: &ReconcileOptions,
    on_processed: F,
) -> ReconcileOutcome
where
    F: Fn(&BookingSummary),
{
    let index = BookingIndex::from_snapshot(prior);
    let gate = Arc::new(Semaphore::new(options.concurrency.max(1)));

    let mut snapshot = Snapshot::default();
    let mut tally = ChangeTally::default();

    for batch in summaries.chunks(options.batch_size.max(1)) {
        // Decide reuse vs fetch up front, so a batch of all-current bookings
        // makes no network calls at all.
        let plan: Vec<Planned> = batch
            .iter()
            .map(|summary| match index.get(&summary.booking_id) {
                Some(prev)
                    if !options.force
                        && prev.status == summary.status
                        && prev.store_name.is_some() =>
                {
                    Planned::Reuse(prev)
                }
                _ => Planned::Fetch(summary),
            })
            .collect();

        // Launch the batch's fetches together. join_all re-joins completions
        // in summary order regardless of which finishes first.
        let fetches = plan.iter().map(|planned| {
            let gate = Arc::clone(&gate);
            async move {
                match planned {
                    Planned::Reuse(_) => None,
                    Planned::Fetch(summary) => {
                        // The permit is held through the pacing sleep, so the
                        // delay throttles admission of follow-on fetches.
                        let _permit = gate.acquire().await.expect("admission gate closed");
                        let detail = fetcher.fetch(&summary.booking_id).await;
                        tokio::time::sleep(options.pacing).await;
                        Some(detail)
                    }
                }
            }
        });
        let results = join_all(fetches).await;

        for (summary, (planned, result)) in batch.iter().zip(plan.iter().zip(results)) {
            match (planned, result) {
                (Planned::Reuse(prev), _) => {
                    snapshot.push((*prev).clone());
                    tally.unchanged += 1;
                }
                (Planned::Fetch(_), Some(Some(detail))) => {
                    if index.contains(&summary.booking_id) {
                        tally.updated += 1;
                    } else {
                        tally.new += 1;
                    }
                    snapshot.push(normalize::normalize(&detail));
                }
                // Failed fetch: the booking sits this run out.
                (Planned::Fetch(_), _) => {}
            }
            on_processed(summary);
        }
    }

    ReconcileOutcome { snapshot, tally }
}
