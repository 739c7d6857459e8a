//! Changelog data model and before/after diffing
//!
//! One drain run produces a [`ChangeSet`]: an append-only sequence of
//! Add/Remove entries, one per value that entered or left a record set.
//! The set is serialized whole-document at the end of the run and is the
//! unit of undrain input.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub mod file;

pub use file::FileChangeLog;

/// Direction of a single value change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAction {
    /// The value entered the record set
    #[serde(rename = "+")]
    Add,
    /// The value left the record set
    #[serde(rename = "-")]
    Remove,
}

/// One value that entered or left a record set during a drain run
///
/// The `(zone, record, record_type)` triple identifies a record that existed
/// (possibly with an empty value set) at drain time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Provider the change was applied through
    pub provider: String,
    /// Add or Remove
    pub action: ChangeAction,
    /// Zone identifier
    pub zone: String,
    /// Record name
    pub record: String,
    /// Record type
    #[serde(rename = "recordType")]
    pub record_type: String,
    /// The value that was added or removed
    pub value: String,
}

/// Ordered sequence of change entries, the on-disk changelog document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Entries in the order they were journaled
    pub changes: Vec<ChangeEntry>,
}

impl ChangeSet {
    /// Number of entries
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// True when no entries were recorded
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Group entries by zone, preserving entry order within each zone
    pub fn group_by_zone(&self) -> HashMap<String, Vec<ChangeEntry>> {
        let mut groups: HashMap<String, Vec<ChangeEntry>> = HashMap::new();

        for change in &self.changes {
            groups
                .entry(change.zone.clone())
                .or_default()
                .push(change.clone());
        }

        groups
    }
}

/// Net occurrence delta per value between `before` and `after`
///
/// Every occurrence in `before` contributes −1 and every occurrence in
/// `after` contributes +1. Values with zero net delta are omitted. Deltas
/// are returned in first-occurrence order across both sequences.
pub fn diff_values(before: &[String], after: &[String]) -> Vec<(String, i64)> {
    let mut order: Vec<String> = Vec::new();
    let mut deltas: HashMap<String, i64> = HashMap::new();

    for value in before {
        if !deltas.contains_key(value) {
            order.push(value.clone());
        }
        *deltas.entry(value.clone()).or_insert(0) -= 1;
    }

    for value in after {
        if !deltas.contains_key(value) {
            order.push(value.clone());
        }
        *deltas.entry(value.clone()).or_insert(0) += 1;
    }

    order
        .into_iter()
        .filter(|value| deltas[value] != 0)
        .map(|value| {
            let delta = deltas[&value];
            (value, delta)
        })
        .collect()
}

/// Change entries describing the transition of one record from `before` to
/// `after`
///
/// One entry per value with a non-zero net delta: positive → Add,
/// negative → Remove. Values present with equal multiplicity in both
/// sequences produce no entry.
pub fn changes_for_record(
    provider: &str,
    zone: &str,
    record: &str,
    record_type: &str,
    before: &[String],
    after: &[String],
) -> Vec<ChangeEntry> {
    diff_values(before, after)
        .into_iter()
        .map(|(value, delta)| ChangeEntry {
            provider: provider.to_string(),
            action: if delta > 0 {
                ChangeAction::Add
            } else {
                ChangeAction::Remove
            },
            zone: zone.to_string(),
            record: record.to_string(),
            record_type: record_type.to_string(),
            value,
        })
        .collect()
}

/// In-memory change journal shared by concurrent zone tasks
///
/// Appends are mutually exclusive; no ordering is imposed on which zone's
/// entries land first. The journal is cheap to clone (shared state) and is
/// drained into a [`ChangeSet`] once, at the end of the drain run.
#[derive(Debug, Clone, Default)]
pub struct ChangeJournal {
    entries: Arc<Mutex<Vec<ChangeEntry>>>,
}

impl ChangeJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry
    pub fn record(&self, entry: ChangeEntry) {
        self.entries
            .lock()
            .expect("change journal lock poisoned")
            .push(entry);
    }

    /// Append a batch of entries under a single lock acquisition
    pub fn record_all(&self, entries: impl IntoIterator<Item = ChangeEntry>) {
        self.entries
            .lock()
            .expect("change journal lock poisoned")
            .extend(entries);
    }

    /// Number of journaled entries
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("change journal lock poisoned")
            .len()
    }

    /// True when nothing was journaled
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot the journal into a serializable [`ChangeSet`]
    pub fn to_change_set(&self) -> ChangeSet {
        ChangeSet {
            changes: self
                .entries
                .lock()
                .expect("change journal lock poisoned")
                .clone(),
        }
    }
}
