//! Raw records from the DaySchedule bookings API.
//!
//! These mirror the wire format and are read-only inputs: unknown fields are
//! ignored, absent fields default, so a tolerant API change doesn't break a
//! sync run.

use serde::{Deserialize, Serialize};

/// Minimal record returned by the listing call. Lives only within one run.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingSummary {
    pub booking_id: String,
    #[serde(default)]
    pub status: String,
}

/// Full record returned by the per-booking detail read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingDetail {
    pub booking_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub booking_url: Option<String>,
    #[serde(default)]
    pub host: Host,
    #[serde(default)]
    pub invitees: Vec<Invitee>,
}

/// The host side of a booking. Carried through to the snapshot as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Host {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The party who made the booking, with their free-form question answers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Invitee {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// One label/value answer pair from the booking form.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub label: String,
    #[serde(default)]
    pub value: Option<String>,
}
