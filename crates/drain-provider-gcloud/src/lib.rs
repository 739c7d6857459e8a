// # Google Cloud DNS Provider
//
// This crate provides a Google Cloud DNS implementation of the drain
// engine's `DnsProvider` trait.
//
// The provider is a thin API client:
//
// - One HTTP request per operation (plus pagination follow-ups)
// - Full error propagation to the engine (the engine logs and skips;
//   nothing is retried here)
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401/403, 404, 5xx)
//
// All reconciliation decisions (keep-set computation, dry-run handling,
// quota accounting) are owned by the engine; this crate never decides
// whether an update is needed.
//
// ## Authentication
//
// Requests carry an OAuth2 bearer token. Acquiring the token (service
// account flow, `gcloud auth print-access-token`, metadata server) is the
// caller's concern. The token never appears in logs or Debug output.
//
// ## API Reference
//
// - Cloud DNS API v1: https://cloud.google.com/dns/docs/reference/v1
// - List zones: GET `/dns/v1/projects/{project}/managedZones`
// - List record sets: GET `/dns/v1/projects/{project}/managedZones/{zone}/rrsets`
// - Apply change: POST `/dns/v1/projects/{project}/managedZones/{zone}/changes`

use async_trait::async_trait;
use drain_core::traits::{DnsProvider, RecordSet, RecordSetChange, Zone};
use drain_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloud DNS API base URL
const CLOUD_DNS_API_BASE: &str = "https://dns.googleapis.com/dns/v1";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Cloud DNS provider
///
/// One instance is shared across all zone tasks of a run; the underlying
/// `reqwest::Client` pools connections internally.
pub struct GoogleCloudDnsProvider {
    /// Project whose zones are managed
    project: String,

    /// OAuth2 bearer token
    /// ⚠️ NEVER log this value
    access_token: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// API base URL (overridable for tests)
    base_url: String,
}

// Custom Debug implementation that hides the access token
impl std::fmt::Debug for GoogleCloudDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCloudDnsProvider")
            .field("project", &self.project)
            .field("access_token", &"<REDACTED>")
            .finish()
    }
}

impl GoogleCloudDnsProvider {
    /// Create a provider client for `project` authenticating with
    /// `access_token`
    ///
    /// Fails fast on an empty project or token so misconfiguration surfaces
    /// before any zone is touched.
    pub fn new(project: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let project = project.into();
        let access_token = access_token.into();

        if project.is_empty() {
            return Err(Error::config("Google Cloud project must not be empty"));
        }

        if access_token.is_empty() {
            return Err(Error::auth("access token must not be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            project,
            access_token,
            client,
            base_url: CLOUD_DNS_API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        page_token: Option<&str>,
    ) -> Result<T> {
        let mut request = self.client.get(url).bearer_auth(&self.access_token);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::provider(format!("request to {} failed: {}", url, e)))?;

        let response = check_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| Error::provider(format!("failed to parse response from {}: {}", url, e)))
    }
}

#[async_trait]
impl DnsProvider for GoogleCloudDnsProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let url = format!("{}/projects/{}/managedZones", self.base_url, self.project);

        let mut zones = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: ManagedZonesResponse =
                self.get_json(&url, page_token.as_deref()).await?;

            zones.extend(page.managed_zones.into_iter().map(|z| Zone {
                name: z.name,
                dns_name: z.dns_name,
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(zones)
    }

    async fn list_record_sets(&self, zone: &str) -> Result<Vec<RecordSet>> {
        let url = format!(
            "{}/projects/{}/managedZones/{}/rrsets",
            self.base_url, self.project, zone
        );

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: RecordSetsResponse = self.get_json(&url, page_token.as_deref()).await?;

            records.extend(page.rrsets.into_iter().map(RecordSet::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(records)
    }

    async fn apply_change(&self, zone: &str, change: &RecordSetChange) -> Result<()> {
        let url = format!(
            "{}/projects/{}/managedZones/{}/changes",
            self.base_url, self.project, zone
        );

        let body = ApiChange {
            deletions: change.deletions.iter().map(ApiRecordSet::from).collect(),
            additions: change.additions.iter().map(ApiRecordSet::from).collect(),
        };

        tracing::debug!(
            "applying change to zone {}: {} deletion(s), {} addition(s)",
            zone,
            body.deletions.len(),
            body.additions.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider(format!("change request for {} failed: {}", zone, e)))?;

        check_status(response).await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "gcloud"
    }
}

/// Map an error status to the engine's error taxonomy
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => Err(Error::auth(format!(
            "Cloud DNS rejected the request ({}): {}",
            status, body
        ))),
        404 => Err(Error::not_found(url.path())),
        _ => Err(Error::provider(format!(
            "Cloud DNS returned {} for {}: {}",
            status,
            url.path(),
            body
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct ManagedZonesResponse {
    #[serde(default, rename = "managedZones")]
    managed_zones: Vec<ApiManagedZone>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiManagedZone {
    name: String,
    #[serde(default, rename = "dnsName")]
    dns_name: String,
}

#[derive(Debug, Deserialize)]
struct RecordSetsResponse {
    #[serde(default)]
    rrsets: Vec<ApiRecordSet>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

/// Wire representation of a record set
#[derive(Debug, Serialize, Deserialize)]
struct ApiRecordSet {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: i64,
    #[serde(default)]
    rrdatas: Vec<String>,
}

impl From<ApiRecordSet> for RecordSet {
    fn from(api: ApiRecordSet) -> Self {
        RecordSet {
            name: api.name,
            record_type: api.record_type,
            ttl: api.ttl,
            values: api.rrdatas,
        }
    }
}

impl From<&RecordSet> for ApiRecordSet {
    fn from(record: &RecordSet) -> Self {
        Self {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            ttl: record.ttl,
            rrdatas: record.values.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiChange {
    deletions: Vec<ApiRecordSet>,
    additions: Vec<ApiRecordSet>,
}
