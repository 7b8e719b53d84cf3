// # Socket IP Source
//
// This crate provides a datagram-socket IP source for the DDNS updater.
//
// ## How It Works
//
// An unbound UDP socket is "connected" to a well-known public IPv6 host.
// Connecting a datagram socket sends nothing; it only makes the kernel pick
// a route and a source address for that destination. Reading the socket's
// local address back gives the address the host uses for outbound IPv6.
//
// The socket lives only for the duration of one probe and is closed on
// every path out of it.
//
// ## Limitations
//
// The address is reported as-is. On hosts without end-to-end global IPv6
// (NAT66, link-local only) it may not be publicly reachable; a warning is
// logged for loopback, link-local and unique-local results.

use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, Ipv6Addr, SocketAddr, SocketAddrV6};
use tokio::net::UdpSocket;
use v6ddns_core::traits::IpSource;
use v6ddns_core::{Error, Result};

/// Public recursive resolver used as the route probe destination
pub const DEFAULT_PROBE_TARGET: SocketAddrV6 =
    SocketAddrV6::new(Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888), 80, 0, 0);

/// Asks the OS which local address it would use to reach a destination
#[async_trait]
pub trait RouteLookup: Send + Sync {
    /// Local endpoint selected for traffic to `target`
    async fn local_addr_for(&self, target: SocketAddrV6) -> io::Result<SocketAddr>;
}

/// [`RouteLookup`] backed by a short-lived tokio UDP socket
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpRouteLookup;

#[async_trait]
impl RouteLookup for UdpRouteLookup {
    async fn local_addr_for(&self, target: SocketAddrV6) -> io::Result<SocketAddr> {
        let socket = UdpSocket::bind((Ipv6Addr::UNSPECIFIED, 0)).await?;
        socket.connect(target).await?;
        socket.local_addr()
    }
}

/// IPv6 address probe using a connected datagram socket
#[derive(Debug, Clone)]
pub struct SocketIpSource<L = UdpRouteLookup> {
    /// Destination used to select the route
    target: SocketAddrV6,

    /// Route lookup implementation
    lookup: L,
}

impl SocketIpSource {
    /// Probe towards [`DEFAULT_PROBE_TARGET`]
    pub fn new() -> Self {
        Self::with_target(DEFAULT_PROBE_TARGET)
    }

    /// Probe towards a custom destination
    pub fn with_target(target: SocketAddrV6) -> Self {
        Self::with_lookup(target, UdpRouteLookup)
    }
}

impl Default for SocketIpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: RouteLookup> SocketIpSource<L> {
    /// Probe with a custom route lookup
    pub fn with_lookup(target: SocketAddrV6, lookup: L) -> Self {
        Self { target, lookup }
    }

    /// Detect the local IPv6 address, or `None` if it cannot be determined
    pub async fn detect_local_ipv6(&self) -> Option<Ipv6Addr> {
        match self.probe().await {
            Ok(address) => Some(address),
            Err(e) => {
                tracing::error!("Failed to get local IPv6 address: {}", e);
                None
            }
        }
    }

    async fn probe(&self) -> Result<Ipv6Addr> {
        let local = self.lookup.local_addr_for(self.target).await.map_err(|e| {
            Error::address_unavailable(format!("route probe to {} failed: {}", self.target, e))
        })?;

        let address = match local.ip() {
            IpAddr::V6(address) => address,
            IpAddr::V4(address) => {
                return Err(Error::address_unavailable(format!(
                    "route probe returned an IPv4 address: {}",
                    address
                )));
            }
        };

        if address.is_unspecified() {
            return Err(Error::address_unavailable(
                "route probe returned the unspecified address",
            ));
        }

        if !looks_global(address) {
            tracing::warn!(
                "Detected IPv6 address {} is not globally routable; publishing it anyway",
                address
            );
        }

        Ok(address)
    }
}

#[async_trait]
impl<L: RouteLookup + 'static> IpSource for SocketIpSource<L> {
    async fn current(&self) -> Result<Ipv6Addr> {
        let address = self.probe().await?;
        tracing::debug!("Route probe via {} selected {}", self.target, address);
        Ok(address)
    }

    fn source_name(&self) -> &'static str {
        "socket"
    }
}

fn looks_global(address: Ipv6Addr) -> bool {
    !(address.is_loopback() || address.is_unicast_link_local() || address.is_unique_local())
}
