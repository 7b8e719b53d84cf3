//! Test doubles and common utilities for engine contract tests
//!
//! The doubles record every call so tests can assert on exactly which
//! provider operations a cycle performed.

#![allow(dead_code)]

use std::io;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use v6ddns_core::error::{Error, Result};
use v6ddns_core::traits::{DnsProvider, DnsRecord, IpSource, Zone};
use v6ddns_core::DdnsConfig;

pub const DOMAIN: &str = "example.com";
pub const RECORD_NAME: &str = "home.example.com";

/// An IpSource that returns a fixed answer and counts calls
pub struct MockIpSource {
    answer: Result<Ipv6Addr>,
    call_count: Arc<AtomicUsize>,
}

impl MockIpSource {
    /// A source that always reports `address`
    pub fn returning(address: &str) -> (Self, Arc<AtomicUsize>) {
        Self::with_answer(Ok(address.parse().expect("valid IPv6 literal")))
    }

    /// A source that never finds an address
    pub fn unavailable() -> (Self, Arc<AtomicUsize>) {
        Self::with_answer(Err(Error::address_unavailable("network unreachable")))
    }

    fn with_answer(answer: Result<Ipv6Addr>) -> (Self, Arc<AtomicUsize>) {
        let call_count = Arc::new(AtomicUsize::new(0));
        let source = Self {
            answer,
            call_count: Arc::clone(&call_count),
        };
        (source, call_count)
    }
}

#[async_trait::async_trait]
impl IpSource for MockIpSource {
    async fn current(&self) -> Result<Ipv6Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}

/// Calls observed by a MockDnsProvider
#[derive(Default)]
pub struct ProviderCalls {
    zone_lookups: AtomicUsize,
    record_lookups: AtomicUsize,
    updates: Mutex<Vec<(String, String, Ipv6Addr)>>,
}

impl ProviderCalls {
    pub fn zone_lookups(&self) -> usize {
        self.zone_lookups.load(Ordering::SeqCst)
    }

    pub fn record_lookups(&self) -> usize {
        self.record_lookups.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// (zone_id, record_id, new_address) for every update call
    pub fn updates(&self) -> Vec<(String, String, Ipv6Addr)> {
        self.updates.lock().unwrap().clone()
    }
}

/// A DnsProvider backed by in-memory zones and records
pub struct MockDnsProvider {
    zones: Vec<Zone>,
    records: Vec<DnsRecord>,
    zone_error: Option<Error>,
    record_error: Option<Error>,
    update_error: Option<Error>,
    calls: Arc<ProviderCalls>,
}

impl MockDnsProvider {
    /// A provider with one zone ("z1") and one AAAA record ("r1") holding `content`
    pub fn with_record(content: &str) -> (Self, Arc<ProviderCalls>) {
        Self::new(
            vec![zone("z1", DOMAIN)],
            vec![record("r1", RECORD_NAME, "AAAA", content)],
        )
    }

    pub fn new(zones: Vec<Zone>, records: Vec<DnsRecord>) -> (Self, Arc<ProviderCalls>) {
        let calls = Arc::new(ProviderCalls::default());
        let provider = Self {
            zones,
            records,
            zone_error: None,
            record_error: None,
            update_error: None,
            calls: Arc::clone(&calls),
        };
        (provider, calls)
    }

    /// Make zone lookups fail with `error`
    pub fn failing_zone_lookup(mut self, error: Error) -> Self {
        self.zone_error = Some(error);
        self
    }

    /// Make record lookups fail with `error`
    pub fn failing_record_lookup(mut self, error: Error) -> Self {
        self.record_error = Some(error);
        self
    }

    /// Make updates fail with `error`
    pub fn failing_update(mut self, error: Error) -> Self {
        self.update_error = Some(error);
        self
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resolve_zone(&self, domain: &str) -> Result<Zone> {
        self.calls.zone_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.zone_error {
            return Err(error.clone());
        }
        self.zones
            .iter()
            .find(|z| z.name == domain)
            .cloned()
            .ok_or_else(|| Error::zone_not_found(domain))
    }

    async fn resolve_record(&self, _zone_id: &str, record_name: &str) -> Result<DnsRecord> {
        self.calls.record_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.record_error {
            return Err(error.clone());
        }
        self.records
            .iter()
            .find(|r| r.is_aaaa_named(record_name))
            .cloned()
            .ok_or_else(|| Error::record_not_found(record_name))
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        new_address: Ipv6Addr,
    ) -> Result<()> {
        self.calls.updates.lock().unwrap().push((
            zone_id.to_string(),
            record.id.clone(),
            new_address,
        ));
        match &self.update_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub fn zone(id: &str, name: &str) -> Zone {
    Zone {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn record(id: &str, name: &str, record_type: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        name: name.to_string(),
        record_type: record_type.to_string(),
        content: content.to_string(),
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config() -> DdnsConfig {
    DdnsConfig::new("test-token", DOMAIN, RECORD_NAME)
}

/// Log sink shared between a scoped subscriber and the test
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Route this thread's events into a fresh buffer until the guard drops
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// First line containing `needle`, panicking with the full output if absent
    pub fn line_with(&self, needle: &str) -> String {
        let output = self.contents();
        output
            .lines()
            .find(|line| line.contains(needle))
            .map(str::to_string)
            .unwrap_or_else(|| panic!("no log line contains {:?}:\n{}", needle, output))
    }
}
