//! Drain engine
//!
//! The Drainer removes or replaces a matching value across the record sets
//! of some or all zones of a project:
//! - list zones, keep those passing the include/skip filters
//! - run one task per surviving zone concurrently
//! - per record set: apply type/name filters, compute the keep-set, guard
//!   against emptying a record, append the replacement value, hand the
//!   result to the record updater
//! - journal the before/after diff of every applied update
//!
//! ## Event Flow
//!
//! 1. Zone listing, include/skip filtering
//! 2. Fan out one task per zone, join behind the wait window
//! 3. Zone task walks record sets in provider listing order
//! 4. Applied updates produce Add/Remove changelog entries
//! 5. The collected entries are returned as one [`ChangeSet`]
//!
//! Zones are reconciled independently: a zone listing failure is logged and
//! that zone contributes zero changes; a record update failure is logged and
//! the zone task moves on. Nothing is retried or rolled back.

use ipnet::IpNet;
use regex::Regex;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::changelog::{ChangeJournal, ChangeSet, changes_for_record};
use crate::error::Result;
use crate::fanout::join_all_within;
use crate::filter::DrainFilter;
use crate::options::DrainOptions;
use crate::traits::{DnsProvider, RecordSet};
use crate::updater::{RecordUpdater, UpdateOutcome};

/// Drains matching values from the record sets of a project's zones
///
/// The three entry points differ only in the match rule they construct;
/// zone fan-out, record handling, quota accounting, and change journaling
/// are shared.
pub struct Drainer {
    provider: Arc<dyn DnsProvider>,
    options: DrainOptions,
    journal: ChangeJournal,
}

impl Drainer {
    /// Create a drainer for the given provider client and options
    ///
    /// One drainer instance corresponds to one invocation: its journal
    /// accumulates the entries of every update it applies.
    pub fn new(provider: Arc<dyn DnsProvider>, options: DrainOptions) -> Self {
        Self {
            provider,
            options,
            journal: ChangeJournal::new(),
        }
    }

    /// Entries journaled so far
    ///
    /// After a timeout this still holds the changes of every zone that
    /// completed in time, so the changelog can be persisted for a later
    /// undrain.
    pub fn changes(&self) -> ChangeSet {
        self.journal.to_change_set()
    }

    /// Remove values that are IP addresses inside `network`, optionally
    /// replacing them with `replacement`
    pub async fn drain_ip_network(
        &self,
        network: IpNet,
        replacement: Option<IpAddr>,
    ) -> Result<ChangeSet> {
        self.run(
            DrainFilter::IpNetwork(network),
            replacement.map(|ip| ip.to_string()),
        )
        .await
    }

    /// Remove values exactly equal to `value`, optionally replacing them
    pub async fn drain_value(
        &self,
        value: impl Into<String>,
        replacement: Option<String>,
    ) -> Result<ChangeSet> {
        self.run(DrainFilter::Value(value.into()), replacement).await
    }

    /// Remove values matched by `regex`, optionally replacing them
    pub async fn drain_regex(
        &self,
        regex: Regex,
        replacement: Option<String>,
    ) -> Result<ChangeSet> {
        self.run(DrainFilter::Regex(regex), replacement).await
    }

    async fn run(&self, filter: DrainFilter, replacement: Option<String>) -> Result<ChangeSet> {
        let zones: Vec<_> = self
            .provider
            .list_zones()
            .await?
            .into_iter()
            .filter(|z| self.zone_selected(&z.name))
            .collect();

        info!("draining {} zone(s)", zones.len());

        let updater = Arc::new(RecordUpdater::new(
            self.provider.clone(),
            self.options.dry_run,
            self.options.limit,
        ));
        let filter = Arc::new(filter);

        let mut tasks = JoinSet::new();
        for zone in zones {
            let task = ZoneDrainTask {
                provider: self.provider.clone(),
                updater: updater.clone(),
                journal: self.journal.clone(),
                filter: filter.clone(),
                replacement: replacement.clone(),
                name_filter: self.options.name_filter.clone(),
                type_filter: self.options.type_filter.clone(),
                force: self.options.force,
            };
            tasks.spawn(async move { task.run(&zone.name).await });
        }

        join_all_within(&mut tasks, self.options.wait_window).await?;

        Ok(self.journal.to_change_set())
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

/// Per-zone drain work, run on its own task
struct ZoneDrainTask {
    provider: Arc<dyn DnsProvider>,
    updater: Arc<RecordUpdater>,
    journal: ChangeJournal,
    filter: Arc<DrainFilter>,
    replacement: Option<String>,
    name_filter: Option<Regex>,
    type_filter: Option<String>,
    force: bool,
}

impl ZoneDrainTask {
    async fn run(&self, zone: &str) {
        let records = match self.provider.list_record_sets(zone).await {
            Ok(records) => records,
            Err(e) => {
                // Zone contributes zero changes, the run continues
                error!("{}: {}", zone, e);
                return;
            }
        };

        for record in &records {
            if let Err(e) = self.handle_record_set(zone, record).await {
                error!("{}: {}", record.name, e);
            }
        }
    }

    async fn handle_record_set(&self, zone: &str, record: &RecordSet) -> Result<()> {
        if let Some(record_type) = &self.type_filter {
            if *record_type != record.record_type {
                return Ok(());
            }
        }

        if let Some(name_filter) = &self.name_filter {
            if !name_filter.is_match(&record.name) {
                return Ok(());
            }
        }

        let mut kept = self.filter.keep(&record.values);

        if kept.is_empty() && self.replacement.is_none() && !self.force {
            warn!(
                "{} {}: draining would leave no values, skipping (supply a replacement or force)",
                record.record_type, record.name
            );
            return Ok(());
        }

        if kept.len() == record.values.len() {
            // Nothing matched
            return Ok(());
        }

        if let Some(replacement) = &self.replacement {
            if !kept.iter().any(|v| v == replacement) {
                kept.push(replacement.clone());
            }
        }

        let outcome = self.updater.apply(zone, record, kept.clone()).await?;
        if outcome == UpdateOutcome::Applied {
            self.journal.record_all(changes_for_record(
                self.provider.provider_name(),
                zone,
                &record.name,
                &record.record_type,
                &record.values,
                &kept,
            ));
        }

        Ok(())
    }
}
