//! Error types for the DDNS updater
//!
//! Configuration errors are fatal and stop the daemon before the scheduler
//! starts. Every other kind is local to a single check cycle: it is logged,
//! ends that cycle early, and the next scheduled tick tries again.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// One or more required settings are absent or empty
    #[error("Missing required configuration: {0}")]
    ConfigurationMissing(String),

    /// A setting is present but its value is not usable
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host's IPv6 address could not be determined
    #[error("Local IPv6 address unavailable: {0}")]
    AddressUnavailable(String),

    /// No zone matched the configured domain
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// No AAAA record matched the configured record name
    #[error("DNS record not found: {0}")]
    RecordNotFound(String),

    /// The provider answered the update with something other than HTTP 200
    #[error("Update rejected (HTTP {status}): {message}")]
    UpdateRejected {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body or a short description
        message: String,
    },

    /// Network or socket failure while talking to the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered 200 with a body we could not interpret
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create a missing-configuration error
    pub fn configuration_missing(msg: impl Into<String>) -> Self {
        Self::ConfigurationMissing(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an address-unavailable error
    pub fn address_unavailable(msg: impl Into<String>) -> Self {
        Self::AddressUnavailable(msg.into())
    }

    /// Create a zone-not-found error
    pub fn zone_not_found(msg: impl Into<String>) -> Self {
        Self::ZoneNotFound(msg.into())
    }

    /// Create a record-not-found error
    pub fn record_not_found(msg: impl Into<String>) -> Self {
        Self::RecordNotFound(msg.into())
    }

    /// Create an update-rejected error
    pub fn update_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::UpdateRejected {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid-response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether this error must stop the process rather than a single cycle
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigurationMissing(_) | Self::Config(_))
    }
}
