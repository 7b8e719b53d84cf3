// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare DNS provider for the DDNS updater.
//
// ## Behaviour
//
// - One HTTP request per trait call; no retry, no backoff, no caching
// - Every request carries `Authorization: Bearer <token>` and
//   `Content-Type: application/json`
// - Every request has a bounded timeout (see `ProviderConfig::http_timeout_secs`)
// - Lookups read only the first page the API returns; pagination is not followed
// - Success means exactly HTTP 200
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones`
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::net::Ipv6Addr;
use std::time::Duration;
use v6ddns_core::config::ProviderConfig;
use v6ddns_core::traits::{AAAA, DnsProvider, DnsRecord, Zone};
use v6ddns_core::{Error, Result};

pub use v6ddns_core::config::DEFAULT_API_BASE_URL;

/// Envelope shared by every Cloudflare v4 response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: T,
}

/// Cloudflare DNS provider
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API root without a trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `base_url`: API root, normally [`DEFAULT_API_BASE_URL`]
    /// - `timeout`: Timeout applied to each request
    pub fn new(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::configuration_missing("Cloudflare API token"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a provider from validated configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.api_token.clone(),
            config.api_base_url.clone(),
            config.http_timeout(),
        )
    }

    fn zones_url(&self) -> String {
        format!("{}/zones", self.base_url)
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    fn record_url(&self, zone_id: &str, record_id: &str) -> String {
        format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, record_id)
    }

    /// Start a request carrying the headers every Cloudflare call needs
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))
    }

    /// GET `url` and decode its `result` list
    ///
    /// A non-200 status is handed back as `Ok(Err(status))` so each caller
    /// can map it to its own not-found error.
    async fn list<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<std::result::Result<Vec<T>, StatusCode>> {
        let response = self.send(self.request(Method::GET, url)).await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("GET {} returned {}", url, status);
            return Ok(Err(status));
        }

        let body: ApiResponse<Vec<T>> = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(format!("Failed to parse response: {}", e)))?;

        Ok(Ok(body.result))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn resolve_zone(&self, domain: &str) -> Result<Zone> {
        tracing::debug!("Looking up zone ID for domain: {}", domain);

        let zones: Vec<Zone> = self
            .list(&self.zones_url())
            .await?
            .map_err(|status| {
                Error::zone_not_found(format!("{} (zone listing returned {})", domain, status))
            })?;

        let zone = zones
            .into_iter()
            .find(|zone| zone.name == domain)
            .ok_or_else(|| Error::zone_not_found(domain))?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone)
    }

    async fn resolve_record(&self, zone_id: &str, record_name: &str) -> Result<DnsRecord> {
        tracing::debug!("Looking up record: {} (type: {})", record_name, AAAA);

        let records: Vec<DnsRecord> = self
            .list(&self.records_url(zone_id))
            .await?
            .map_err(|status| {
                Error::record_not_found(format!(
                    "{} (record listing returned {})",
                    record_name, status
                ))
            })?;

        let record = records
            .into_iter()
            .find(|record| record.is_aaaa_named(record_name))
            .ok_or_else(|| Error::record_not_found(format!("{} (type: {})", record_name, AAAA)))?;

        tracing::debug!("Found record ID: {}", record.id);
        Ok(record)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        new_address: Ipv6Addr,
    ) -> Result<()> {
        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} ({})",
            record.name,
            new_address,
            AAAA
        );

        let payload = serde_json::json!({
            "type": AAAA,
            "name": record.name,
            "content": new_address.to_string(),
            "proxied": false,
        });

        let url = self.record_url(zone_id, &record.id);
        let response = self
            .send(self.request(Method::PUT, &url).json(&payload))
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::update_rejected(status.as_u16(), error_text));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
