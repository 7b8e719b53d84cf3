// # IP Source Trait
//
// Defines the interface for detecting the host's current IPv6 address.
//
// ## Implementations
//
// - Datagram socket route probe: `v6ddns-ip-socket` crate
//
// ## Usage
//
// ```rust,ignore
// use v6ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> v6ddns_core::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("Current IPv6 address: {}", current_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv6Addr;

/// Trait for IP source implementations
///
/// A source is asked for the address once per check cycle. It must not
/// cache between calls, retry, or decide whether DNS needs updating; the
/// engine owns all of that.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IPv6 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv6Addr)`: The address the host would use for outbound IPv6 traffic
    /// - `Err(Error::AddressUnavailable)`: If no address could be determined
    async fn current(&self) -> Result<Ipv6Addr, crate::Error>;

    /// Name of the source (for logging)
    fn source_name(&self) -> &'static str;
}
