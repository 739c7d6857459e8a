//! Test doubles and common utilities for engine contract tests
//!
//! Provides an in-memory DnsProvider whose zones and record sets live in a
//! mutex-guarded map, with call counters and controllable failure modes
//! (listing errors, stalled listings) for the coordinator contracts.

#![allow(dead_code)]

use async_trait::async_trait;
use drain_core::error::{Error, Result};
use drain_core::traits::{DnsProvider, RecordSet, RecordSetChange, Zone};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory DNS provider double
///
/// `apply_change` mutates the stored record sets, so a drain followed by an
/// undrain against the same instance exercises the full round trip.
pub struct MockDnsProvider {
    zones: Mutex<Vec<Zone>>,
    records: Mutex<HashMap<String, Vec<RecordSet>>>,
    applied: Mutex<Vec<(String, RecordSetChange)>>,
    apply_call_count: AtomicUsize,
    list_failures: Mutex<HashSet<String>>,
    stalled_zones: Mutex<HashSet<String>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            zones: Mutex::new(Vec::new()),
            records: Mutex::new(HashMap::new()),
            applied: Mutex::new(Vec::new()),
            apply_call_count: AtomicUsize::new(0),
            list_failures: Mutex::new(HashSet::new()),
            stalled_zones: Mutex::new(HashSet::new()),
        }
    }

    /// Add a zone with the given record sets
    pub fn add_zone(&self, name: &str, records: Vec<RecordSet>) {
        self.zones.lock().unwrap().push(Zone {
            name: name.to_string(),
            dns_name: format!("{}.example.com.", name),
        });
        self.records
            .lock()
            .unwrap()
            .insert(name.to_string(), records);
    }

    /// Make record listing fail for a zone
    pub fn fail_listing(&self, zone: &str) {
        self.list_failures.lock().unwrap().insert(zone.to_string());
    }

    /// Make record listing hang forever for a zone
    pub fn stall_listing(&self, zone: &str) {
        self.stalled_zones.lock().unwrap().insert(zone.to_string());
    }

    /// Number of apply_change calls so far
    pub fn apply_call_count(&self) -> usize {
        self.apply_call_count.load(Ordering::SeqCst)
    }

    /// All changes applied so far, in call order
    pub fn applied_changes(&self) -> Vec<(String, RecordSetChange)> {
        self.applied.lock().unwrap().clone()
    }

    /// Current values of a record set, None when the record does not exist
    pub fn record_values(&self, zone: &str, name: &str, record_type: &str) -> Option<Vec<String>> {
        self.records
            .lock()
            .unwrap()
            .get(zone)?
            .iter()
            .find(|r| r.name == name && r.record_type == record_type)
            .map(|r| r.values.clone())
    }
}

impl Default for MockDnsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        Ok(self.zones.lock().unwrap().clone())
    }

    async fn list_record_sets(&self, zone: &str) -> Result<Vec<RecordSet>> {
        if self.stalled_zones.lock().unwrap().contains(zone) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        if self.list_failures.lock().unwrap().contains(zone) {
            return Err(Error::provider(format!("listing failed for {}", zone)));
        }

        self.records
            .lock()
            .unwrap()
            .get(zone)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("zone {}", zone)))
    }

    async fn apply_change(&self, zone: &str, change: &RecordSetChange) -> Result<()> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);
        self.applied
            .lock()
            .unwrap()
            .push((zone.to_string(), change.clone()));

        let mut records = self.records.lock().unwrap();
        let zone_records = records
            .get_mut(zone)
            .ok_or_else(|| Error::not_found(format!("zone {}", zone)))?;

        for deletion in &change.deletions {
            zone_records
                .retain(|r| !(r.name == deletion.name && r.record_type == deletion.record_type));
        }

        for addition in &change.additions {
            zone_records.push(addition.clone());
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Record set shorthand for test setup
pub fn record(name: &str, record_type: &str, values: &[&str]) -> RecordSet {
    RecordSet::new(
        name,
        record_type,
        300,
        values.iter().map(|s| s.to_string()).collect(),
    )
}

/// Provider with a single zone holding the given record sets
pub fn provider_with_zone(zone: &str, records: Vec<RecordSet>) -> Arc<MockDnsProvider> {
    let provider = Arc::new(MockDnsProvider::new());
    provider.add_zone(zone, records);
    provider
}
