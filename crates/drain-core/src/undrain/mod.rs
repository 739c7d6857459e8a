//! Undrain engine
//!
//! Reverts a prior drain run from its persisted changelog. Entries are
//! grouped by zone, then by `(record, record type)`; each record's target
//! value set is reconstructed by inverting the logged entries against the
//! record's *current* values (undo an Add by removing the value, undo a
//! Remove by re-adding it) and routed through the same record updater the
//! drain path uses. No diff is journaled during undrain.
//!
//! Reconstruction uses presence semantics: a value is either in the target
//! set or not, so duplicate values within one record set collapse.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::changelog::{ChangeAction, ChangeEntry, ChangeSet};
use crate::error::Result;
use crate::fanout::join_all_within;
use crate::options::UndrainOptions;
use crate::traits::{DnsProvider, RecordSet};
use crate::updater::RecordUpdater;

/// TTL for records that were fully removed since the drain and have to be
/// recreated
const RECREATED_RECORD_TTL: i64 = 300;

/// Reverts the changes recorded in a [`ChangeSet`]
pub struct Undrainer {
    provider: Arc<dyn DnsProvider>,
    options: UndrainOptions,
}

impl Undrainer {
    /// Create an undrainer for the given provider client and options
    pub fn new(provider: Arc<dyn DnsProvider>, options: UndrainOptions) -> Self {
        Self { provider, options }
    }

    /// Revert every entry of `changes`, one concurrent task per zone
    ///
    /// Re-running an undrain is safe: a record that already carries its
    /// reconstructed value set short-circuits in the updater as unchanged.
    pub async fn undrain(&self, changes: &ChangeSet) -> Result<()> {
        let groups: Vec<_> = changes
            .group_by_zone()
            .into_iter()
            .filter(|(zone, _)| self.zone_selected(zone))
            .collect();

        info!("undraining {} zone(s)", groups.len());

        let updater = Arc::new(RecordUpdater::new(
            self.provider.clone(),
            self.options.dry_run,
            self.options.limit,
        ));

        let mut tasks = JoinSet::new();
        for (zone, entries) in groups {
            let task = ZoneUndrainTask {
                provider: self.provider.clone(),
                updater: updater.clone(),
            };
            tasks.spawn(async move { task.run(&zone, entries).await });
        }

        join_all_within(&mut tasks, self.options.wait_window).await
    }

    fn zone_selected(&self, zone: &str) -> bool {
        if let Some(skip) = &self.options.skip_filter {
            if skip.is_match(zone) {
                return false;
            }
        }

        match &self.options.zone_filter {
            Some(filter) => filter.is_match(zone),
            None => true,
        }
    }
}

/// Per-zone undrain work, run on its own task
struct ZoneUndrainTask {
    provider: Arc<dyn DnsProvider>,
    updater: Arc<RecordUpdater>,
}

impl ZoneUndrainTask {
    async fn run(&self, zone: &str, entries: Vec<ChangeEntry>) {
        let records = match self.provider.list_record_sets(zone).await {
            Ok(records) => records,
            Err(e) => {
                error!("{}: {}", zone, e);
                return;
            }
        };

        for ((record, record_type), group) in group_by_record(entries) {
            if let Err(e) = self.revert_record(zone, &record, &record_type, group, &records).await
            {
                error!("{}: {}", record, e);
            }
        }
    }

    async fn revert_record(
        &self,
        zone: &str,
        record: &str,
        record_type: &str,
        entries: Vec<ChangeEntry>,
        records: &[RecordSet],
    ) -> Result<()> {
        let current = match find_record_set(record, record_type, records) {
            Some(rec) => rec.clone(),
            None => {
                // The record may have been fully removed since the drain
                warn!("record {} not found in zone {}, recreating", record, zone);
                RecordSet::new(record, record_type, RECREATED_RECORD_TTL, Vec::new())
            }
        };

        let target = reconstruct_values(&current.values, &entries);
        self.updater.apply(zone, &current, target).await?;

        Ok(())
    }
}

/// Group a zone's entries by `(record, record type)`, preserving entry order
/// within each group
fn group_by_record(entries: Vec<ChangeEntry>) -> HashMap<(String, String), Vec<ChangeEntry>> {
    let mut groups: HashMap<(String, String), Vec<ChangeEntry>> = HashMap::new();

    for entry in entries {
        groups
            .entry((entry.record.clone(), entry.record_type.clone()))
            .or_default()
            .push(entry);
    }

    groups
}

fn find_record_set<'a>(
    name: &str,
    record_type: &str,
    records: &'a [RecordSet],
) -> Option<&'a RecordSet> {
    records
        .iter()
        .find(|r| r.name == name && r.record_type == record_type)
}

/// Invert a record's logged entries against its current values
///
/// Starts from the current values (duplicates collapsed), then undoes each
/// entry: an Add is reverted by removing the value, a Remove by re-adding
/// it. Membership is presence-based (0/1), so multiplicity is not restored.
fn reconstruct_values(current: &[String], entries: &[ChangeEntry]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for value in current {
        if !result.contains(value) {
            result.push(value.clone());
        }
    }

    for entry in entries {
        match entry.action {
            ChangeAction::Add => result.retain(|v| *v != entry.value),
            ChangeAction::Remove => {
                if !result.contains(&entry.value) {
                    result.push(entry.value.clone());
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn entry(action: ChangeAction, value: &str) -> ChangeEntry {
        ChangeEntry {
            provider: "gcloud".to_string(),
            action,
            zone: "zone-a".to_string(),
            record: "www.example.com.".to_string(),
            record_type: "A".to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn remove_entries_are_re_added() {
        let target = reconstruct_values(
            &values(&["1.2.3.5"]),
            &[entry(ChangeAction::Remove, "1.2.3.4")],
        );
        assert_eq!(target, values(&["1.2.3.5", "1.2.3.4"]));
    }

    #[test]
    fn add_entries_are_removed() {
        let target = reconstruct_values(
            &values(&["1.2.3.5", "1.2.3.4"]),
            &[entry(ChangeAction::Add, "1.2.3.5")],
        );
        assert_eq!(target, values(&["1.2.3.4"]));
    }

    #[test]
    fn replacement_drain_is_fully_inverted() {
        // Drain replaced 1.2.3.4 with 1.2.3.5: log holds one Remove and
        // one Add; inverting both restores the pre-drain set
        let target = reconstruct_values(
            &values(&["1.2.3.5"]),
            &[
                entry(ChangeAction::Remove, "1.2.3.4"),
                entry(ChangeAction::Add, "1.2.3.5"),
            ],
        );
        assert_eq!(target, values(&["1.2.3.4"]));
    }

    #[test]
    fn re_adding_a_present_value_is_a_no_op() {
        let target = reconstruct_values(
            &values(&["1.2.3.4"]),
            &[entry(ChangeAction::Remove, "1.2.3.4")],
        );
        assert_eq!(target, values(&["1.2.3.4"]));
    }

    #[test]
    fn duplicate_current_values_collapse() {
        let target = reconstruct_values(&values(&["a", "a", "b"]), &[]);
        assert_eq!(target, values(&["a", "b"]));
    }

    #[test]
    fn grouping_splits_by_name_and_type() {
        let mut a = entry(ChangeAction::Add, "x");
        a.record_type = "A".to_string();
        let mut txt = entry(ChangeAction::Add, "y");
        txt.record_type = "TXT".to_string();

        let groups = group_by_record(vec![a.clone(), txt.clone()]);
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[&("www.example.com.".to_string(), "A".to_string())],
            vec![a]
        );
        assert_eq!(
            groups[&("www.example.com.".to_string(), "TXT".to_string())],
            vec![txt]
        );
    }
}
