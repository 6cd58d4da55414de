//! Normalization of raw booking details into the snapshot shape.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::booking::{BookingDetail, Host, Invitee};

/// Patient fields resolved from the invitee's question answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
}

/// Canonical output shape for one booking.
///
/// At most one of `store_name`/`booking_url` is present: a URL matching a
/// known host pattern is replaced by the derived store name, otherwise the
/// raw URL is kept. A raw detail carrying no booking URL at all yields
/// neither field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBooking {
    pub booking_id: String,
    pub status: String,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    #[serde(default)]
    pub host: Host,
    #[serde(default)]
    pub patient: PatientRecord,
}

/// Ordered URL patterns for deriving a store name from a booking URL.
/// Each known host carries its own trailing-segment convention to strip.
static STORE_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // section21: store slug followed by "-dr-<doctor>-<appointment type>"
        Regex::new(r"^https?://section21\.dayschedule\.com/(?P<slug>.+?)-dr-.+$")
            .expect("invalid store URL pattern"),
        // section21bookings: store slug followed by "-dr-<appointment type>(-<n>)"
        Regex::new(r"^https?://section21bookings\.dayschedule\.com/(?P<slug>.+?)-dr(?:-.+)?$")
            .expect("invalid store URL pattern"),
    ]
});

/// Derive a human-readable store name from a booking URL.
///
/// The first matching pattern wins; its captured slug has hyphens replaced
/// with spaces and each word title-cased. Returns `None` when the URL matches
/// no known host convention.
pub fn extract_store_name(url: &str) -> Option<String> {
    STORE_URL_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|caps| caps.name("slug"))
            .map(|slug| title_case(slug.as_str()))
    })
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the canonical output record for one raw booking detail.
///
/// Pure: no side effects, no network access. Uses the first invitee; if none
/// is present, all invitee-derived fields are empty.
pub fn normalize(raw: &BookingDetail) -> NormalizedBooking {
    let invitee = raw.invitees.first().cloned().unwrap_or_default();
    let patient = build_patient(&invitee);

    let store_name = raw.booking_url.as_deref().and_then(extract_store_name);
    let booking_url = if store_name.is_some() {
        None
    } else {
        raw.booking_url.clone()
    };

    NormalizedBooking {
        booking_id: raw.booking_id.clone(),
        status: raw.status.clone(),
        start_at: raw.start_at.clone(),
        end_at: raw.end_at.clone(),
        store_name,
        booking_url,
        host: raw.host.clone(),
        patient,
    }
}

fn build_patient(invitee: &Invitee) -> PatientRecord {
    // Last occurrence wins when the API repeats a question label.
    let mut questions: HashMap<&str, &str> = HashMap::new();
    for question in &invitee.questions {
        if let Some(value) = question.value.as_deref() {
            questions.insert(question.label.as_str(), value);
        }
    }

    let full_name = format!(
        "{} {}",
        questions.get("Name").copied().unwrap_or(""),
        questions.get("Surname").copied().unwrap_or("")
    )
    .trim()
    .to_string();

    let answer = |label: &str| questions.get(label).map(|value| value.to_string());

    PatientRecord {
        full_name,
        email: answer("Your email address").or_else(|| invitee.email.clone()),
        phone: answer("Mobile number").or_else(|| invitee.phone.clone()),
        date_of_birth: answer("Date of Birth"),
        gender: answer("Gender"),
        height: answer("Height"),
        weight: answer("Weight"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::Question;

    fn question(label: &str, value: &str) -> Question {
        Question {
            label: label.to_string(),
            value: Some(value.to_string()),
        }
    }

    fn detail_with_url(url: &str) -> BookingDetail {
        BookingDetail {
            booking_id: "b-1".to_string(),
            status: "confirmed".to_string(),
            booking_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_store_name_from_primary_host() {
        let name =
            extract_store_name("https://section21.dayschedule.com/acme-clinic-dr-m-tupy-consultation");
        assert_eq!(name.as_deref(), Some("Acme Clinic"));
    }

    #[test]
    fn test_store_name_from_bookings_host() {
        let name = extract_store_name(
            "https://section21bookings.dayschedule.com/acme-clinic-dr-consultation-1",
        );
        assert_eq!(name.as_deref(), Some("Acme Clinic"));
    }

    #[test]
    fn test_store_name_unknown_host() {
        assert_eq!(
            extract_store_name("https://example.com/acme-clinic-dr-consultation"),
            None
        );
    }

    #[test]
    fn test_normalize_replaces_matched_url_with_store_name() {
        let raw = detail_with_url("https://section21.dayschedule.com/acme-clinic-dr-m-tupy-consultation");
        let normalized = normalize(&raw);

        assert_eq!(normalized.store_name.as_deref(), Some("Acme Clinic"));
        assert_eq!(normalized.booking_url, None);
    }

    #[test]
    fn test_normalize_keeps_unmatched_url_verbatim() {
        let raw = detail_with_url("https://example.com/some-other-page");
        let normalized = normalize(&raw);

        assert_eq!(normalized.store_name, None);
        assert_eq!(
            normalized.booking_url.as_deref(),
            Some("https://example.com/some-other-page")
        );
    }

    #[test]
    fn test_missing_booking_url_leaves_both_fields_absent() {
        let raw = BookingDetail {
            booking_id: "b-3".to_string(),
            status: "confirmed".to_string(),
            ..Default::default()
        };

        let normalized = normalize(&raw);
        assert_eq!(normalized.store_name, None);
        assert_eq!(normalized.booking_url, None);
    }

    #[test]
    fn test_full_name_joins_and_trims() {
        let invitee = Invitee {
            questions: vec![question("Name", "Jane"), question("Surname", "Doe")],
            ..Default::default()
        };
        assert_eq!(build_patient(&invitee).full_name, "Jane Doe");

        let only_name = Invitee {
            questions: vec![question("Name", "Jane")],
            ..Default::default()
        };
        assert_eq!(build_patient(&only_name).full_name, "Jane");

        assert_eq!(build_patient(&Invitee::default()).full_name, "");
    }

    #[test]
    fn test_email_and_phone_prefer_questions_over_invitee_fields() {
        let invitee = Invitee {
            email: Some("fallback@example.com".to_string()),
            phone: Some("000".to_string()),
            questions: vec![
                question("Your email address", "answered@example.com"),
                question("Mobile number", "12345"),
            ],
        };

        let patient = build_patient(&invitee);
        assert_eq!(patient.email.as_deref(), Some("answered@example.com"));
        assert_eq!(patient.phone.as_deref(), Some("12345"));
    }

    #[test]
    fn test_email_and_phone_fall_back_to_invitee_fields() {
        let invitee = Invitee {
            email: Some("fallback@example.com".to_string()),
            phone: Some("000".to_string()),
            questions: vec![],
        };

        let patient = build_patient(&invitee);
        assert_eq!(patient.email.as_deref(), Some("fallback@example.com"));
        assert_eq!(patient.phone.as_deref(), Some("000"));
    }

    // Documents current behavior: repeated labels silently overwrite in
    // traversal order. If the API ever emits duplicates meaningfully, this
    // truncates data.
    #[test]
    fn test_duplicate_question_labels_last_wins() {
        let invitee = Invitee {
            questions: vec![question("Gender", "first"), question("Gender", "second")],
            ..Default::default()
        };
        assert_eq!(build_patient(&invitee).gender.as_deref(), Some("second"));
    }

    #[test]
    fn test_no_invitees_gives_empty_patient() {
        let raw = BookingDetail {
            booking_id: "b-2".to_string(),
            status: "pending".to_string(),
            ..Default::default()
        };

        let normalized = normalize(&raw);
        assert_eq!(normalized.patient, PatientRecord::default());
    }
}
