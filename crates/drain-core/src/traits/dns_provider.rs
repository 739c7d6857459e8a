// # DNS Provider Trait
//
// Defines the interface for reading and replacing record sets via provider
// APIs.
//
// ## Implementations
//
// - Google Cloud DNS: `drain-provider-gcloud` crate
// - Future: Route53, Cloudflare, etc.
//
// ## Contract
//
// Providers are thin API clients. All reconciliation decisions (which values
// to keep, whether an update is needed, quota accounting, dry-run handling)
// are owned by the engine. Providers only:
//
// - list zones of a project
// - list the record sets of a zone
// - apply one atomic change (record set deletions + additions)
//
// Implementations must not retry on their own; a failed call is reported to
// the engine, which logs it and moves on (nothing is retried automatically).

use async_trait::async_trait;

/// A DNS zone as reported by the provider
///
/// Zones are owned by the provider and read-only to this system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Zone identifier used in API calls (e.g. "my-zone")
    pub name: String,
    /// The DNS name the zone serves (e.g. "example.com.")
    pub dns_name: String,
}

/// A record set within a zone, identified by `(name, record_type)`
///
/// Holds the ordered sequence of string values ("rrdatas"). The provider has
/// no partial-update primitive: every mutation is a full replace expressed
/// as a [`RecordSetChange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Fully qualified record name (e.g. "www.example.com.")
    pub name: String,
    /// Record type (e.g. "A", "AAAA", "TXT")
    pub record_type: String,
    /// Time-to-live in seconds
    pub ttl: i64,
    /// Record values in provider-returned order
    pub values: Vec<String>,
}

impl RecordSet {
    /// Create a record set with the given identity and values
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: i64,
        values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            ttl,
            values,
        }
    }

    /// Copy of this record set carrying a different value sequence
    pub fn with_values(&self, values: Vec<String>) -> Self {
        Self {
            name: self.name.clone(),
            record_type: self.record_type.clone(),
            ttl: self.ttl,
            values,
        }
    }
}

/// One atomic change request against a zone
///
/// The provider applies all deletions and additions in a single call. A pure
/// delete carries no additions (the new value sequence was empty); a pure
/// create carries no deletions (the record did not previously exist).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSetChange {
    /// Record sets to remove
    pub deletions: Vec<RecordSet>,
    /// Record sets to create
    pub additions: Vec<RecordSet>,
}

impl RecordSetChange {
    /// Build the change that replaces `old` with the same record carrying
    /// `values`
    ///
    /// An empty `old.values` means the record does not exist yet, so there is
    /// nothing to delete; empty `values` means the record is removed
    /// entirely.
    pub fn replacing(old: &RecordSet, values: Vec<String>) -> Self {
        let mut change = Self::default();

        if !old.values.is_empty() {
            change.deletions.push(old.clone());
        }

        if !values.is_empty() {
            change.additions.push(old.with_values(values));
        }

        change
    }
}

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe: one client instance is shared across
/// all concurrently running zone tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List all zones of the configured project
    async fn list_zones(&self) -> Result<Vec<Zone>, crate::Error>;

    /// List all record sets of a zone, in provider-returned order
    async fn list_record_sets(&self, zone: &str) -> Result<Vec<RecordSet>, crate::Error>;

    /// Apply one atomic change (deletions + additions) to a zone
    ///
    /// The call is atomic from the provider's perspective. On error nothing
    /// is assumed about the record's state; the engine reports the failure
    /// and does not mark the change as applied.
    async fn apply_change(&self, zone: &str, change: &RecordSetChange)
    -> Result<(), crate::Error>;

    /// Get the provider name (recorded in changelog entries)
    fn provider_name(&self) -> &'static str;
}
