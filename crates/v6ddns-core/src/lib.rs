// # v6ddns-core
//
// Core library for the IPv6 dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping one AAAA record
// in sync with the host's IPv6 address:
// - **IpSource**: Trait for detecting the current IPv6 address
// - **DnsProvider**: Trait for zone/record lookup and record updates via provider APIs
// - **DdnsEngine**: Runs the detect → compare → update cycle and schedules it
// - **DdnsConfig**: Immutable configuration, loaded once and passed to constructors
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Single Flight**: One cycle at a time, startup cycle first, then a fixed interval
// 3. **Cycle-Local Failures**: A failed step ends its cycle; it never stops the scheduler
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, LogConfig, ProviderConfig};
pub use engine::{CycleOutcome, CycleStage, DdnsEngine, RunSummary};
pub use error::{Error, Result};
pub use traits::{DnsProvider, DnsRecord, IpSource, Zone};
