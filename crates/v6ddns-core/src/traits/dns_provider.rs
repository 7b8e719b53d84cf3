// # DNS Provider Trait
//
// Defines the interface for reading and writing the managed AAAA record
// through a provider's management API.
//
// ## Implementations
//
// - Cloudflare: `v6ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use v6ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> v6ddns_core::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zone = provider.resolve_zone("example.com").await?;
//     let record = provider.resolve_record(&zone.id, "home.example.com").await?;
//     provider
//         .update_record(&zone.id, &record, "2001:db8::2".parse().unwrap())
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;

/// Record type managed by the updater
pub const AAAA: &str = "AAAA";

/// A provider-side zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-specific zone identifier
    pub id: String,
    /// Zone name (e.g. "example.com")
    pub name: String,
}

/// A DNS record as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-specific record identifier
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record type ("A", "AAAA", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value; an IPv6 address for AAAA records
    pub content: String,
}

impl DnsRecord {
    /// Whether this record is the AAAA record named `record_name`
    ///
    /// Names are compared exactly; there is no case folding.
    pub fn is_aaaa_named(&self, record_name: &str) -> bool {
        self.name == record_name && self.record_type == AAAA
    }

    /// Whether the record already points at `address`
    ///
    /// Content that parses as IPv6 is compared by value, so `2001:DB8::1`
    /// and `2001:db8:0::1` both match `2001:db8::1`. Anything else is
    /// compared as text.
    pub fn points_to(&self, address: Ipv6Addr) -> bool {
        match self.content.parse::<Ipv6Addr>() {
            Ok(current) => current == address,
            Err(_) => self.content == address.to_string(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// Each method makes exactly one API call and never retries: a failure is
/// returned to the engine, which abandons the current cycle and tries again
/// on the next tick.
///
/// Lookups inspect only what the provider returns for a plain list request;
/// pagination is not followed.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Find the zone whose name equals `domain` exactly
    ///
    /// # Returns
    ///
    /// - `Ok(Zone)`: The first matching zone
    /// - `Err(Error::ZoneNotFound)`: Non-200 status or no zone with that name
    /// - `Err(Error::Transport)`: The request could not be completed
    async fn resolve_zone(&self, domain: &str) -> Result<Zone, crate::Error>;

    /// Find the first AAAA record named `record_name` in `zone_id`
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The first matching record
    /// - `Err(Error::RecordNotFound)`: Non-200 status or no matching AAAA record
    /// - `Err(Error::Transport)`: The request could not be completed
    async fn resolve_record(
        &self,
        zone_id: &str,
        record_name: &str,
    ) -> Result<DnsRecord, crate::Error>;

    /// Replace `record` with an AAAA record pointing at `new_address`
    ///
    /// Success is strictly HTTP 200; anything else is
    /// `Err(Error::UpdateRejected)`.
    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        new_address: Ipv6Addr,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
