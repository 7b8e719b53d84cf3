//! Configuration types for the DDNS updater
//!
//! Configuration is read once from the environment, validated, and handed
//! to each component's constructor. Nothing reads the environment after
//! startup.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

/// API token variable
pub const ENV_API_TOKEN: &str = "CF_API_TOKEN";
/// Zone (domain) name variable
pub const ENV_DOMAIN: &str = "DOMAIN";
/// AAAA record name variable
pub const ENV_RECORD_NAME: &str = "RECORD_NAME";
/// Check interval (minutes) variable
pub const ENV_CHECK_INTERVAL: &str = "CHECK_INTERVAL";
/// Provider API root override
pub const ENV_API_BASE_URL: &str = "CF_API_BASE_URL";
/// Per-request HTTP timeout (seconds)
pub const ENV_HTTP_TIMEOUT_SECS: &str = "DDNS_HTTP_TIMEOUT_SECS";
/// Log level variable
pub const ENV_LOG_LEVEL: &str = "DDNS_LOG_LEVEL";
/// Log file path variable
pub const ENV_LOG_FILE: &str = "DDNS_LOG_FILE";

/// Cloudflare API v4 root
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

const DEFAULT_CHECK_INTERVAL_MINS: u64 = 5;
const MAX_CHECK_INTERVAL_MINS: u64 = 24 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const MAX_HTTP_TIMEOUT_SECS: u64 = 300;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "ddns.log";

/// Main DDNS configuration
#[derive(Clone, PartialEq, Eq)]
pub struct DdnsConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Zone name the record lives in (e.g. "example.com")
    pub domain: String,

    /// Fully qualified AAAA record name (e.g. "home.example.com")
    pub record_name: String,

    /// Minutes between scheduled checks
    pub check_interval_mins: u64,
}

impl DdnsConfig {
    /// Create a configuration with default interval and provider settings
    pub fn new(
        api_token: impl Into<String>,
        domain: impl Into<String>,
        record_name: impl Into<String>,
    ) -> Self {
        Self {
            provider: ProviderConfig::new(api_token),
            domain: domain.into(),
            record_name: record_name.into(),
            check_interval_mins: DEFAULT_CHECK_INTERVAL_MINS,
        }
    }

    /// Set the check interval in minutes
    pub fn with_check_interval_mins(mut self, minutes: u64) -> Self {
        self.check_interval_mins = minutes;
        self
    }

    /// Load and validate configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load and validate configuration from an arbitrary key lookup
    ///
    /// Every missing required key is reported in a single
    /// [`Error::ConfigurationMissing`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_token = value(ENV_API_TOKEN);
        let domain = value(ENV_DOMAIN);
        let record_name = value(ENV_RECORD_NAME);

        let missing: Vec<&str> = [
            (ENV_API_TOKEN, api_token.is_none()),
            (ENV_DOMAIN, domain.is_none()),
            (ENV_RECORD_NAME, record_name.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(api_token), Some(domain), Some(record_name)) = (api_token, domain, record_name)
        else {
            return Err(Error::configuration_missing(missing.join(", ")));
        };

        let check_interval_mins = match value(ENV_CHECK_INTERVAL) {
            Some(raw) => parse_number(ENV_CHECK_INTERVAL, &raw)?,
            None => DEFAULT_CHECK_INTERVAL_MINS,
        };

        let mut provider = ProviderConfig::new(api_token);
        if let Some(base_url) = value(ENV_API_BASE_URL) {
            provider.api_base_url = base_url;
        }
        if let Some(raw) = value(ENV_HTTP_TIMEOUT_SECS) {
            provider.http_timeout_secs = parse_number(ENV_HTTP_TIMEOUT_SECS, &raw)?;
        }

        let config = Self {
            provider,
            domain,
            record_name,
            check_interval_mins,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.provider.api_token.trim().is_empty() {
            missing.push(ENV_API_TOKEN);
        }
        if self.domain.trim().is_empty() {
            missing.push(ENV_DOMAIN);
        }
        if self.record_name.trim().is_empty() {
            missing.push(ENV_RECORD_NAME);
        }
        if !missing.is_empty() {
            return Err(Error::configuration_missing(missing.join(", ")));
        }

        if !(1..=MAX_CHECK_INTERVAL_MINS).contains(&self.check_interval_mins) {
            return Err(Error::config(format!(
                "{} must be between 1 and {} minutes. Got: {}",
                ENV_CHECK_INTERVAL, MAX_CHECK_INTERVAL_MINS, self.check_interval_mins
            )));
        }

        self.provider.validate()
    }

    /// Interval between scheduled checks
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_mins * 60)
    }
}

// The token is redacted so configuration can be logged safely.
impl fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("provider", &self.provider)
            .field("domain", &self.domain)
            .field("record_name", &self.record_name)
            .field("check_interval_mins", &self.check_interval_mins)
            .finish()
    }
}

/// DNS provider configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Bearer token for the provider API
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// API root, without a trailing slash
    pub api_base_url: String,

    /// Timeout applied to every outbound request
    pub http_timeout_secs: u64,
}

impl ProviderConfig {
    /// Create a provider configuration pointing at the public Cloudflare API
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(Error::configuration_missing(ENV_API_TOKEN));
        }

        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://")
        {
            return Err(Error::config(format!(
                "{} must use HTTP or HTTPS scheme. Got: {}",
                ENV_API_BASE_URL, self.api_base_url
            )));
        }

        if !(1..=MAX_HTTP_TIMEOUT_SECS).contains(&self.http_timeout_secs) {
            return Err(Error::config(format!(
                "{} must be between 1 and {} seconds. Got: {}",
                ENV_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS, self.http_timeout_secs
            )));
        }

        Ok(())
    }

    /// Timeout applied to every outbound request
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<REDACTED>")
            .field("api_base_url", &self.api_base_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Logging configuration
///
/// Read separately from [`DdnsConfig`] because logging has to be running
/// before a configuration error can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Requested level name (trace, debug, info, warn, error)
    pub level: String,

    /// Append-only log file
    pub file: String,
}

impl LogConfig {
    /// Load logging settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load logging settings from an arbitrary key lookup, using defaults
    /// for anything absent
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            level: value(ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            file: value(ENV_LOG_FILE).unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.parse().map_err(|_| {
        Error::config(format!(
            "{} must be a positive integer. Got: '{}'",
            key, raw
        ))
    })
}
