//! Contract tests for the undrain path
//!
//! Verifies that the changelog-based reversal reconstructs pre-drain state,
//! recreates fully removed records, honors zone filters and the limit, and
//! stays idempotent under re-application.

mod common;

use common::*;
use drain_core::changelog::{ChangeAction, ChangeEntry, ChangeSet};
use drain_core::{DrainOptions, Drainer, UndrainOptions, Undrainer};
use regex::Regex;
use std::sync::Arc;

fn entry(
    zone: &str,
    record: &str,
    record_type: &str,
    action: ChangeAction,
    value: &str,
) -> ChangeEntry {
    ChangeEntry {
        provider: "mock".to_string(),
        action,
        zone: zone.to_string(),
        record: record.to_string(),
        record_type: record_type.to_string(),
        value: value.to_string(),
    }
}

fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

#[tokio::test]
async fn undrain_reverts_a_remove_entry() {
    let provider = provider_with_zone("zone-a", vec![record("www.example.com.", "A", &["1.2.3.5"])]);

    let changes = ChangeSet {
        changes: vec![entry(
            "zone-a",
            "www.example.com.",
            "A",
            ChangeAction::Remove,
            "1.2.3.4",
        )],
    };

    Undrainer::new(provider.clone(), UndrainOptions::new())
        .undrain(&changes)
        .await
        .unwrap();

    assert_eq!(
        provider.record_values("zone-a", "www.example.com.", "A"),
        Some(vec!["1.2.3.5".to_string(), "1.2.3.4".to_string()])
    );
}

#[tokio::test]
async fn undrain_is_a_left_inverse_of_drain() {
    let provider = provider_with_zone(
        "zone-a",
        vec![record("www.example.com.", "A", &["10.0.0.1", "8.8.8.8"])],
    );

    let changes = Drainer::new(provider.clone(), DrainOptions::new())
        .drain_ip_network(
            "10.0.0.0/24".parse().unwrap(),
            Some("192.0.2.1".parse().unwrap()),
        )
        .await
        .unwrap();

    assert_eq!(
        provider.record_values("zone-a", "www.example.com.", "A"),
        Some(vec!["8.8.8.8".to_string(), "192.0.2.1".to_string()])
    );

    Undrainer::new(provider.clone(), UndrainOptions::new())
        .undrain(&changes)
        .await
        .unwrap();

    assert_eq!(
        provider
            .record_values("zone-a", "www.example.com.", "A")
            .map(sorted),
        Some(sorted(vec!["10.0.0.1".to_string(), "8.8.8.8".to_string()]))
    );
}

#[tokio::test]
async fn fully_removed_records_are_recreated() {
    // The record was deleted after the drain; undrain synthesizes an empty
    // record set and re-adds the removed value as a pure create
    let provider = provider_with_zone("zone-a", vec![]);

    let changes = ChangeSet {
        changes: vec![entry(
            "zone-a",
            "gone.example.com.",
            "A",
            ChangeAction::Remove,
            "1.2.3.4",
        )],
    };

    Undrainer::new(provider.clone(), UndrainOptions::new())
        .undrain(&changes)
        .await
        .unwrap();

    assert_eq!(
        provider.record_values("zone-a", "gone.example.com.", "A"),
        Some(vec!["1.2.3.4".to_string()])
    );

    let applied = provider.applied_changes();
    assert_eq!(applied.len(), 1);
    assert!(applied[0].1.deletions.is_empty());
    assert_eq!(applied[0].1.additions.len(), 1);
}

#[tokio::test]
async fn undrain_is_idempotent() {
    let provider = provider_with_zone("zone-a", vec![record("www.example.com.", "A", &["1.2.3.5"])]);

    let changes = ChangeSet {
        changes: vec![entry(
            "zone-a",
            "www.example.com.",
            "A",
            ChangeAction::Remove,
            "1.2.3.4",
        )],
    };

    let undrainer = Undrainer::new(provider.clone(), UndrainOptions::new());
    undrainer.undrain(&changes).await.unwrap();
    assert_eq!(provider.apply_call_count(), 1);

    // The record already carries the reconstructed values: no further call
    let undrainer = Undrainer::new(provider.clone(), UndrainOptions::new());
    undrainer.undrain(&changes).await.unwrap();
    assert_eq!(provider.apply_call_count(), 1);
}

#[tokio::test]
async fn zone_filters_apply_to_undrain() {
    let provider = Arc::new(MockDnsProvider::new());
    provider.add_zone("prod-zone", vec![record("a.example.com.", "A", &["9.9.9.9"])]);
    provider.add_zone("dev-zone", vec![record("b.example.com.", "A", &["8.8.8.8"])]);

    let changes = ChangeSet {
        changes: vec![
            entry("prod-zone", "a.example.com.", "A", ChangeAction::Remove, "10.0.0.1"),
            entry("dev-zone", "b.example.com.", "A", ChangeAction::Remove, "10.0.0.2"),
        ],
    };

    let options = UndrainOptions::new().with_zone_filter(Regex::new("^prod-").unwrap());
    Undrainer::new(provider.clone(), options)
        .undrain(&changes)
        .await
        .unwrap();

    assert_eq!(
        provider.record_values("prod-zone", "a.example.com.", "A"),
        Some(vec!["9.9.9.9".to_string(), "10.0.0.1".to_string()])
    );
    // Filtered out: untouched
    assert_eq!(
        provider.record_values("dev-zone", "b.example.com.", "A"),
        Some(vec!["8.8.8.8".to_string()])
    );
}

#[tokio::test]
async fn undrain_honors_the_limit() {
    let provider = Arc::new(MockDnsProvider::new());
    provider.add_zone("zone-a", vec![record("a.example.com.", "A", &["9.9.9.9"])]);
    provider.add_zone("zone-b", vec![record("b.example.com.", "A", &["8.8.8.8"])]);

    let changes = ChangeSet {
        changes: vec![
            entry("zone-a", "a.example.com.", "A", ChangeAction::Remove, "10.0.0.1"),
            entry("zone-b", "b.example.com.", "A", ChangeAction::Remove, "10.0.0.2"),
        ],
    };

    Undrainer::new(provider.clone(), UndrainOptions::new().with_limit(1))
        .undrain(&changes)
        .await
        .unwrap();

    assert_eq!(provider.apply_call_count(), 1);
}

#[tokio::test]
async fn dry_run_undrain_applies_nothing() {
    let provider = provider_with_zone("zone-a", vec![record("www.example.com.", "A", &["1.2.3.5"])]);

    let changes = ChangeSet {
        changes: vec![entry(
            "zone-a",
            "www.example.com.",
            "A",
            ChangeAction::Remove,
            "1.2.3.4",
        )],
    };

    Undrainer::new(provider.clone(), UndrainOptions::new().with_dry_run(true))
        .undrain(&changes)
        .await
        .unwrap();

    assert_eq!(provider.apply_call_count(), 0);
    assert_eq!(
        provider.record_values("zone-a", "www.example.com.", "A"),
        Some(vec!["1.2.3.5".to_string()])
    );
}
