//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Running a check cycle: probe the local address, resolve the zone,
//!   resolve the AAAA record, compare, and update if needed
//! - Scheduling cycles: once at startup, then every `check_interval`
//!
//! ## Cycle Flow
//!
//! ```text
//! ProbeAddress ──► ResolveZone ──► ResolveRecord ──► Compare ──┬──► UpdateRecord
//!      │                │                 │                    └──► Unchanged
//!      └────────────────┴─────────────────┴──► Failed (cycle ends, next tick retries)
//! ```
//!
//! A cycle never returns an error: every failure is logged and folded into
//! [`CycleOutcome::Failed`], so the scheduler keeps running.

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpSource};
use std::fmt;
use std::future::Future;
use std::net::Ipv6Addr;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Step of a check cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    /// Detecting the local IPv6 address
    ProbeAddress,
    /// Looking up the zone ID for the domain
    ResolveZone,
    /// Looking up the AAAA record in the zone
    ResolveRecord,
    /// Writing the new address to the record
    UpdateRecord,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleStage::ProbeAddress => "probe address",
            CycleStage::ResolveZone => "resolve zone",
            CycleStage::ResolveRecord => "resolve record",
            CycleStage::UpdateRecord => "update record",
        };
        f.write_str(name)
    }
}

/// Result of one check cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The record already pointed at the local address; no update was sent
    Unchanged {
        /// The local (and published) address
        address: Ipv6Addr,
    },

    /// The record was updated
    Updated {
        /// Previous record content
        previous: String,
        /// Newly published address
        current: Ipv6Addr,
    },

    /// The cycle ended early
    Failed {
        /// Step that failed
        stage: CycleStage,
        /// Why it failed
        error: Error,
    },
}

impl CycleOutcome {
    fn failed(stage: CycleStage) -> impl FnOnce(Error) -> Self {
        move |error| CycleOutcome::Failed { stage, error }
    }
}

/// Counters accumulated by the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles run, including the startup cycle
    pub cycles: u64,
    /// Cycles that updated the record
    pub updated: u64,
    /// Cycles that found the record already current
    pub unchanged: u64,
    /// Cycles that ended early
    pub failed: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Unchanged { .. } => self.unchanged += 1,
            CycleOutcome::Updated { .. } => self.updated += 1,
            CycleOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run_until()`]
/// 3. Engine runs until the shutdown future completes
///
/// ## Threading
///
/// Everything runs on the caller's task. A cycle always completes before
/// the next tick or a shutdown request is looked at, so cycles never overlap.
pub struct DdnsEngine {
    /// IP source for detecting the local address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and updating the record
    provider: Box<dyn DnsProvider>,

    /// Zone name to resolve
    domain: String,

    /// AAAA record to keep in sync
    record_name: String,

    /// Time between scheduled cycles
    check_interval: Duration,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: Validated DDNS configuration
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            domain: config.domain.clone(),
            record_name: config.record_name.clone(),
            check_interval: config.check_interval(),
        })
    }

    /// Run one check cycle to completion
    ///
    /// The outcome is logged here; callers only need it for bookkeeping.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let outcome = match self.check_and_update().await {
            Ok(outcome) | Err(outcome) => outcome,
        };

        match &outcome {
            CycleOutcome::Unchanged { address } => {
                info!(
                    record = %self.record_name,
                    address = %address,
                    "IP address unchanged, no update needed"
                );
            }
            CycleOutcome::Updated { previous, current } => {
                info!(
                    record = %self.record_name,
                    previous = %previous,
                    current = %current,
                    "DNS record updated successfully"
                );
            }
            CycleOutcome::Failed { stage, error } => {
                error!(
                    record = %self.record_name,
                    stage = %stage,
                    "Check cycle failed: {}",
                    error
                );
            }
        }

        outcome
    }

    /// The cycle state machine; `Err` carries the early-exit outcome
    async fn check_and_update(&self) -> std::result::Result<CycleOutcome, CycleOutcome> {
        let local = self
            .ip_source
            .current()
            .await
            .map_err(CycleOutcome::failed(CycleStage::ProbeAddress))?;
        debug!("Local IPv6 address from {}: {}", self.ip_source.source_name(), local);

        let zone = self
            .provider
            .resolve_zone(&self.domain)
            .await
            .map_err(CycleOutcome::failed(CycleStage::ResolveZone))?;
        debug!("Resolved zone {} -> {}", zone.name, zone.id);

        let record = self
            .provider
            .resolve_record(&zone.id, &self.record_name)
            .await
            .map_err(CycleOutcome::failed(CycleStage::ResolveRecord))?;
        debug!("Resolved record {} -> {}", record.name, record.id);

        if record.points_to(local) {
            return Ok(CycleOutcome::Unchanged { address: local });
        }

        info!(
            record = %self.record_name,
            "IP change detected: {} -> {}",
            record.content,
            local
        );

        self.provider
            .update_record(&zone.id, &record, local)
            .await
            .map_err(CycleOutcome::failed(CycleStage::UpdateRecord))?;

        Ok(CycleOutcome::Updated {
            previous: record.content,
            current: local,
        })
    }

    /// Run the scheduler until `shutdown` completes
    ///
    /// One cycle runs immediately, then one per `check_interval` measured
    /// from the end of the startup cycle. If a cycle overruns the interval,
    /// the next tick is delayed rather than doubled up.
    pub async fn run_until<F>(&self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut summary = RunSummary::default();

        info!(
            record = %self.record_name,
            provider = self.provider.provider_name(),
            "Starting scheduler (interval: {:?})",
            self.check_interval
        );

        let outcome = self.run_cycle().await;
        summary.record(&outcome);

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.check_interval, self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }

                _ = ticker.tick() => {}
            }

            let outcome = self.run_cycle().await;
            summary.record(&outcome);
        }

        info!(
            "Scheduler stopped after {} cycle(s): {} updated, {} unchanged, {} failed",
            summary.cycles, summary.updated, summary.unchanged, summary.failed
        );

        summary
    }

    /// Time between scheduled cycles
    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }
}
