// # Core Traits
//
// Interfaces between the reconciliation engine and external collaborators.

pub mod dns_provider;

pub use dns_provider::{DnsProvider, RecordSet, RecordSetChange, Zone};
