// # drain-core
//
// Core library for the DNS drain/undrain reconciliation engine.
//
// ## Architecture Overview
//
// - **DnsProvider**: Trait for the provider API client (zone listing,
//   record listing, atomic record set changes)
// - **DrainFilter**: Pure match rules deciding which record values are kept
// - **RecordUpdater**: Idempotent record replacement with a process-wide
//   update quota
// - **Drainer**: Concurrent per-zone drain coordinator, produces a ChangeSet
// - **Undrainer**: Changelog-based reversal through the same updater
// - **ChangeJournal / FileChangeLog**: In-memory collection and
//   whole-document persistence of Add/Remove entries
//
// ## Design Principles
//
// 1. **Zones are independent**: one task per zone, no cross-zone ordering,
//    no transactions, no rollback
// 2. **Idempotency**: an update whose target equals the current value set is
//    a no-op and consumes no quota
// 3. **Partial-failure tolerance**: zone and record errors are logged and
//    skipped; only configuration, client setup, and the join timeout are
//    fatal

pub mod changelog;
pub mod drain;
pub mod error;
pub mod filter;
pub mod options;
pub mod traits;
pub mod undrain;
pub mod updater;

mod fanout;

// Re-export core types for convenience
pub use changelog::{ChangeAction, ChangeEntry, ChangeJournal, ChangeSet, FileChangeLog};
pub use drain::Drainer;
pub use error::{Error, Result};
pub use filter::DrainFilter;
pub use options::{DrainOptions, UNLIMITED, UndrainOptions};
pub use traits::{DnsProvider, RecordSet, RecordSetChange, Zone};
pub use undrain::Undrainer;
pub use updater::{RecordUpdater, UpdateOutcome};
