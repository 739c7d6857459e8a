//! Record updater
//!
//! Applies a desired value sequence to a record set: no-ops when nothing
//! changed, enforces the process-wide update quota, emits before/after
//! descriptions, and performs (or simulates) the provider call.
//!
//! One updater instance is shared by all concurrently running zone tasks of
//! a drain or undrain run; the quota counter is the only mutable state and
//! is maintained with atomic increments.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::info;

use crate::error::Result;
use crate::traits::{DnsProvider, RecordSet, RecordSetChange};

/// Result of handing a record and its desired values to the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The change was applied (or simulated under dry-run)
    Applied,
    /// The record already carried the desired values; nothing was done
    Unchanged,
    /// The update quota is exhausted; nothing was applied or logged
    Skipped,
}

/// Applies value-sequence replacements through the provider
///
/// The updater owns the update quota: only records whose value set actually
/// differs consume it, and once `limit` is exceeded every further differing
/// record is skipped entirely.
pub struct RecordUpdater {
    provider: Arc<dyn DnsProvider>,
    dry_run: bool,
    limit: i64,
    counter: AtomicI64,
}

impl RecordUpdater {
    /// Create an updater with the given quota (`UNLIMITED` = no quota)
    pub fn new(provider: Arc<dyn DnsProvider>, dry_run: bool, limit: i64) -> Self {
        Self {
            provider,
            dry_run,
            limit,
            counter: AtomicI64::new(0),
        }
    }

    /// Number of differing records seen so far (applied or quota-skipped)
    pub fn changed_count(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Replace `record`'s values with `values`
    ///
    /// Value sequences are compared as sets-as-presented: the same values in
    /// a different order count as equal and short-circuit to
    /// [`UpdateOutcome::Unchanged`] without a provider call. This makes
    /// re-applying an already-correct target a no-op.
    pub async fn apply(
        &self,
        zone: &str,
        record: &RecordSet,
        values: Vec<String>,
    ) -> Result<UpdateOutcome> {
        if values_equal(&record.values, &values) {
            return Ok(UpdateOutcome::Unchanged);
        }

        let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if self.limit >= 0 && count > self.limit {
            return Ok(UpdateOutcome::Skipped);
        }

        if !record.values.is_empty() {
            info!("- {}: {} {:?}", record.name, record.record_type, record.values);
        }

        if !values.is_empty() {
            info!("+ {}: {} {:?}", record.name, record.record_type, values);
        }

        if self.dry_run {
            return Ok(UpdateOutcome::Applied);
        }

        let change = RecordSetChange::replacing(record, values);
        self.provider.apply_change(zone, &change).await?;

        Ok(UpdateOutcome::Applied)
    }
}

/// Compare two value sequences as multisets
fn values_equal(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn equal_sequences_compare_equal() {
        assert!(values_equal(&values(&["a", "b"]), &values(&["a", "b"])));
    }

    #[test]
    fn order_does_not_matter() {
        assert!(values_equal(&values(&["a", "b"]), &values(&["b", "a"])));
    }

    #[test]
    fn multiplicity_matters() {
        assert!(!values_equal(&values(&["a", "a"]), &values(&["a"])));
        assert!(!values_equal(&values(&["a", "a", "b"]), &values(&["a", "b", "b"])));
    }

    #[test]
    fn empty_sequences_are_equal() {
        assert!(values_equal(&[], &[]));
        assert!(!values_equal(&values(&["a"]), &[]));
    }
}
