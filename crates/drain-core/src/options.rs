//! Option types for drain and undrain runs
//!
//! Optional regex filters are modeled as `Option<Regex>` so that "no filter
//! configured" is an explicit state rather than an empty pattern.

use regex::Regex;
use std::time::Duration;

/// Sentinel meaning "no limit on the number of changed records"
pub const UNLIMITED: i64 = -1;

/// Default wall-clock window the coordinator waits for all zone tasks
pub const DEFAULT_WAIT_WINDOW: Duration = Duration::from_secs(120);

/// Options controlling a drain run
#[derive(Debug, Clone)]
pub struct DrainOptions {
    /// Do not modify DNS records, only simulate and log
    pub dry_run: bool,

    /// Remove a value even if it is the only value of the record
    pub force: bool,

    /// Apply only to zones matching this regex (all zones when unset)
    pub zone_filter: Option<Regex>,

    /// Skip zones matching this regex
    pub skip_filter: Option<Regex>,

    /// Apply only to records whose name matches this regex
    pub name_filter: Option<Regex>,

    /// Apply only to records of exactly this type
    pub type_filter: Option<String>,

    /// Maximum number of records to change across all zones
    /// ([`UNLIMITED`] = no limit)
    pub limit: i64,

    /// Wall-clock window to wait for all zone tasks to complete
    pub wait_window: Duration,
}

impl DrainOptions {
    /// Create options with defaults (no filters, unlimited, live run)
    pub fn new() -> Self {
        Self {
            dry_run: false,
            force: false,
            zone_filter: None,
            skip_filter: None,
            name_filter: None,
            type_filter: None,
            limit: UNLIMITED,
            wait_window: DEFAULT_WAIT_WINDOW,
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable or disable the force flag
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the zone include filter
    pub fn with_zone_filter(mut self, filter: Regex) -> Self {
        self.zone_filter = Some(filter);
        self
    }

    /// Set the zone skip filter
    pub fn with_skip_filter(mut self, filter: Regex) -> Self {
        self.skip_filter = Some(filter);
        self
    }

    /// Set the record name filter
    pub fn with_name_filter(mut self, filter: Regex) -> Self {
        self.name_filter = Some(filter);
        self
    }

    /// Set the record type filter (exact match)
    pub fn with_type_filter(mut self, record_type: impl Into<String>) -> Self {
        self.type_filter = Some(record_type.into());
        self
    }

    /// Set the maximum number of records to change
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the coordinator wait window
    pub fn with_wait_window(mut self, window: Duration) -> Self {
        self.wait_window = window;
        self
    }
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options controlling an undrain run
#[derive(Debug, Clone)]
pub struct UndrainOptions {
    /// Do not modify DNS records, only simulate and log
    pub dry_run: bool,

    /// Apply only to zones matching this regex (all zones when unset)
    pub zone_filter: Option<Regex>,

    /// Skip zones matching this regex
    pub skip_filter: Option<Regex>,

    /// Maximum number of records to change across all zones
    /// ([`UNLIMITED`] = no limit)
    pub limit: i64,

    /// Wall-clock window to wait for all zone tasks to complete
    pub wait_window: Duration,
}

impl UndrainOptions {
    /// Create options with defaults (no filters, unlimited, live run)
    pub fn new() -> Self {
        Self {
            dry_run: false,
            zone_filter: None,
            skip_filter: None,
            limit: UNLIMITED,
            wait_window: DEFAULT_WAIT_WINDOW,
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the zone include filter
    pub fn with_zone_filter(mut self, filter: Regex) -> Self {
        self.zone_filter = Some(filter);
        self
    }

    /// Set the zone skip filter
    pub fn with_skip_filter(mut self, filter: Regex) -> Self {
        self.skip_filter = Some(filter);
        self
    }

    /// Set the maximum number of records to change
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the coordinator wait window
    pub fn with_wait_window(mut self, window: Duration) -> Self {
        self.wait_window = window;
        self
    }
}

impl Default for UndrainOptions {
    fn default() -> Self {
        Self::new()
    }
}
