//! HTTP client for the DaySchedule bookings API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use booksync_core::booking::{BookingDetail, BookingSummary};
use booksync_core::fetch::DetailFetcher;
use owo_colors::OwoColorize;
use serde::Deserialize;

/// Client for the DaySchedule v1 API.
///
/// Authentication is a static credential appended to every request as the
/// `apiKey` query parameter. One client is acquired per run and threaded
/// through the reconciliation engine.
pub struct DayScheduleClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Envelope around the listing call's payload.
#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    result: Vec<BookingSummary>,
}

impl DayScheduleClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        DayScheduleClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// GET /bookings
    ///
    /// Lists all current booking summaries. A failure here is fatal to the
    /// run, so errors propagate.
    pub async fn list_bookings(&self) -> Result<Vec<BookingSummary>> {
        let resp = self
            .http
            .get(format!("{}/bookings", self.base_url))
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to reach the DaySchedule API")?;

        if !resp.status().is_success() {
            anyhow::bail!("Booking listing failed with status {}", resp.status());
        }

        let body: ListResponse = resp
            .json()
            .await
            .context("Failed to decode booking listing")?;

        Ok(body.result)
    }
}

#[async_trait]
impl DetailFetcher for DayScheduleClient {
    /// GET /bookings/{id}
    ///
    /// Reads one booking's full record. Any transport failure, non-success
    /// status or decode error is reported and converted to `None`; the
    /// engine then skips the booking for this run.
    async fn fetch(&self, booking_id: &str) -> Option<BookingDetail> {
        let url = format!("{}/bookings/{}", self.base_url, booking_id);

        let resp = match self
            .http
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn(&format!("Failed to fetch booking {booking_id}: {e}"));
                return None;
            }
        };

        if !resp.status().is_success() {
            warn(&format!(
                "Failed to fetch booking {booking_id}: status {}",
                resp.status()
            ));
            return None;
        }

        match resp.json::<BookingDetail>().await {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn(&format!("Failed to decode booking {booking_id}: {e}"));
                None
            }
        }
    }
}

fn warn(message: &str) {
    eprintln!("{}", message.yellow());
}
