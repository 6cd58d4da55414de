//! Snapshot persistence and the per-run booking index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BookSyncResult;
use crate::normalize::NormalizedBooking;

/// The persisted, status-grouped collection of normalized bookings from the
/// most recent run. Overwritten wholesale on every successful sync.
///
/// A booking id appears in at most one group: the grouping key is the
/// lower-cased raw status, where `confirmed`, `pending` and `canceled` each
/// map to their own group and every other status lands in `other`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confirmed: Vec<NormalizedBooking>,
    #[serde(default)]
    pub pending: Vec<NormalizedBooking>,
    #[serde(default)]
    pub canceled: Vec<NormalizedBooking>,
    #[serde(default)]
    pub other: Vec<NormalizedBooking>,
}

impl Snapshot {
    /// Append a booking to the group matching its lower-cased status.
    pub fn push(&mut self, booking: NormalizedBooking) {
        let group = match booking.status.to_lowercase().as_str() {
            "confirmed" => &mut self.confirmed,
            "pending" => &mut self.pending,
            "canceled" => &mut self.canceled,
            _ => &mut self.other,
        };
        group.push(booking);
    }

    /// The groups in display order, with their snapshot keys.
    pub fn groups(&self) -> [(&'static str, &[NormalizedBooking]); 4] {
        [
            ("confirmed", self.confirmed.as_slice()),
            ("pending", self.pending.as_slice()),
            ("canceled", self.canceled.as_slice()),
            ("other", self.other.as_slice()),
        ]
    }

    /// Iterate every booking across all groups.
    pub fn iter_bookings(&self) -> impl Iterator<Item = &NormalizedBooking> {
        self.confirmed
            .iter()
            .chain(&self.pending)
            .chain(&self.canceled)
            .chain(&self.other)
    }

    pub fn total(&self) -> usize {
        self.confirmed.len() + self.pending.len() + self.canceled.len() + self.other.len()
    }
}

/// Per-run lookup from booking id to its previously synced record.
///
/// Built once from the loaded snapshot; read-only during reconciliation.
pub struct BookingIndex<'a> {
    entries: HashMap<&'a str, &'a NormalizedBooking>,
}

impl<'a> BookingIndex<'a> {
    pub fn from_snapshot(snapshot: &'a Snapshot) -> Self {
        let entries = snapshot
            .iter_bookings()
            .map(|booking| (booking.booking_id.as_str(), booking))
            .collect();

        BookingIndex { entries }
    }

    pub fn get(&self, booking_id: &str) -> Option<&'a NormalizedBooking> {
        self.entries.get(booking_id).copied()
    }

    pub fn contains(&self, booking_id: &str) -> bool {
        self.entries.contains_key(booking_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads and saves the snapshot file.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous snapshot.
    ///
    /// A missing, unreadable or structurally invalid file yields a fresh
    /// empty snapshot rather than an error; the run then effectively
    /// processes every booking as new.
    pub fn load(&self) -> Snapshot {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return Snapshot::default();
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                eprintln!(
                    "Ignoring unreadable snapshot {}: {}",
                    self.path.display(),
                    e
                );
                Snapshot::default()
            }
        }
    }

    /// Overwrite the snapshot file wholesale.
    ///
    /// Writes to a temp file and renames, so a failed write never leaves a
    /// truncated document where a valid snapshot used to be.
    pub fn save(&self, snapshot: &Snapshot) -> BookSyncResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(snapshot)?;
        let temp = self.path.with_extension("tmp");
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(id: &str, status: &str) -> NormalizedBooking {
        NormalizedBooking {
            booking_id: id.to_string(),
            status: status.to_string(),
            start_at: None,
            end_at: None,
            store_name: Some("Acme Clinic".to_string()),
            booking_url: None,
            host: Default::default(),
            patient: Default::default(),
        }
    }

    #[test]
    fn test_push_groups_by_lowercased_status() {
        let mut snapshot = Snapshot::default();
        snapshot.push(booking("b-1", "Confirmed"));
        snapshot.push(booking("b-2", "pending"));
        snapshot.push(booking("b-3", "weird_state"));

        assert_eq!(snapshot.confirmed.len(), 1);
        assert_eq!(snapshot.pending.len(), 1);
        assert_eq!(snapshot.other.len(), 1);
        assert_eq!(snapshot.canceled.len(), 0);
        assert_eq!(snapshot.total(), 3);
    }

    #[test]
    fn test_index_spans_all_groups() {
        let mut snapshot = Snapshot::default();
        snapshot.push(booking("b-1", "confirmed"));
        snapshot.push(booking("b-2", "canceled"));
        snapshot.push(booking("b-3", "no_show"));

        let index = BookingIndex::from_snapshot(&snapshot);
        assert_eq!(index.len(), 3);
        assert!(index.contains("b-2"));
        assert_eq!(index.get("b-3").map(|b| b.status.as_str()), Some("no_show"));
        assert!(index.get("b-4").is_none());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("missing.json"));

        let snapshot = store.load();
        assert!(snapshot.last_updated.is_none());
        assert_eq!(snapshot.total(), 0);
    }

    #[test]
    fn test_load_corrupt_file_returns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bookings.json");
        std::fs::write(&path, "{ this is not json").expect("write");

        let snapshot = SnapshotStore::new(&path).load();
        assert!(snapshot.last_updated.is_none());
        assert_eq!(snapshot.total(), 0);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("bookings.json"));

        let mut snapshot = Snapshot::default();
        snapshot.last_updated = Some(Utc::now());
        snapshot.push(booking("b-1", "confirmed"));
        store.save(&snapshot).expect("save");

        let loaded = store.load();
        assert_eq!(loaded.confirmed.len(), 1);
        assert_eq!(loaded.confirmed[0].booking_id, "b-1");
        assert!(loaded.last_updated.is_some());
    }
}
