//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Detect the host's current IPv6 address
//! - [`DnsProvider`]: Look up and update the AAAA record via a provider API

pub mod dns_provider;
pub mod ip_source;

pub use dns_provider::{AAAA, DnsProvider, DnsRecord, Zone};
pub use ip_source::IpSource;
