//! The detail-fetch seam between the reconciliation engine and the network.

use async_trait::async_trait;

use crate::booking::BookingDetail;

/// One network read of a booking's full record.
///
/// Implementations convert every transport or HTTP failure into `None`
/// (logging the identifier and cause) so the engine can treat a failed fetch
/// uniformly as "skip this booking for this run". Nothing raises past this
/// boundary.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch(&self, booking_id: &str) -> Option<BookingDetail>;
}
