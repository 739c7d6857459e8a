//! Record value filters
//!
//! Pure functions mapping a record's current values and a match rule to the
//! subset of values to *keep*, preserving the original order. The filters
//! are total: a value that cannot be interpreted (e.g. a non-IP string
//! checked against a network) is conservatively kept.

use ipnet::IpNet;
use regex::Regex;
use std::net::IpAddr;

/// Match rule deciding which record values are dropped
///
/// Exactly one rule is active per drain run. The rule is a sum type so the
/// match logic stays total without optional-pattern checks scattered through
/// the filters.
#[derive(Debug, Clone)]
pub enum DrainFilter {
    /// Drop values that parse as an IP address contained in the network
    IpNetwork(IpNet),
    /// Drop values equal to the target string
    Value(String),
    /// Drop values the regex matches anywhere in
    Regex(Regex),
}

impl DrainFilter {
    /// Values of `values` this filter keeps, in original order
    pub fn keep(&self, values: &[String]) -> Vec<String> {
        match self {
            DrainFilter::IpNetwork(net) => keep_outside_network(values, net),
            DrainFilter::Value(value) => keep_not_equal(values, value),
            DrainFilter::Regex(regex) => keep_not_matching(values, regex),
        }
    }
}

/// Keep values that are not an IP inside `net`
///
/// Values that do not parse as an IP address are kept.
pub fn keep_outside_network(values: &[String], net: &IpNet) -> Vec<String> {
    values
        .iter()
        .filter(|v| match v.parse::<IpAddr>() {
            Ok(ip) => !net.contains(&ip),
            Err(_) => true,
        })
        .cloned()
        .collect()
}

/// Keep values that are not exactly equal to `value`
pub fn keep_not_equal(values: &[String], value: &str) -> Vec<String> {
    values.iter().filter(|v| *v != value).cloned().collect()
}

/// Keep values the regex does not match anywhere in
pub fn keep_not_matching(values: &[String], regex: &Regex) -> Vec<String> {
    values
        .iter()
        .filter(|v| !regex.is_match(v))
        .cloned()
        .collect()
}
