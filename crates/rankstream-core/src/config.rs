//! Configuration for transports, sessions and the event decoder
//!
//! Every section has a `Default` that matches the sourcing backend, so
//! `RankStreamConfig::default()` works out of the box against a local
//! deployment. All sections deserialize from JSON with missing fields falling
//! back to their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default backend endpoint for strategic sourcing queries
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/companies/strategic_search";

/// Default status shown between submission and the first backend status
pub const DEFAULT_INITIAL_STATUS: &str = "Finding relevant candidates from the database...";

/// Default cap on a single pending line (1 MiB)
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankStreamConfig {
    /// HTTP transport settings
    pub transport: TransportConfig,
    /// Session lifecycle settings
    pub session: SessionConfig,
    /// Event field extraction settings
    pub decoder: DecoderConfig,
}

impl RankStreamConfig {
    /// Parse configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the transport section
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the session section
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Replace the decoder section
    pub fn with_decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }

    /// Reject values that would make a session unusable
    pub fn validate(&self) -> Result<()> {
        self.transport.validate()?;
        self.session.validate()?;
        self.decoder.validate()
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Endpoint receiving `POST {"query": ...}`
    pub endpoint: String,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: Option<u64>,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_ms: Some(10_000),
            user_agent: concat!("rankstream/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    /// Use a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::config("transport.endpoint must not be empty"));
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(Error::config("transport.connect_timeout_ms must be positive"));
        }
        Ok(())
    }
}

/// When subscribers receive snapshots while streaming
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyMode {
    /// After every line that changed the aggregate
    #[default]
    PerLine,
    /// Once per chunk, after all of its lines were applied
    PerChunk,
}

/// Session lifecycle settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fail the session when no chunk arrives for this long; disabled when `None`
    pub idle_timeout_ms: Option<u64>,
    /// Status shown before the backend reports its own
    pub initial_status: Option<String>,
    /// Snapshot cadence
    pub notify: NotifyMode,
    /// Largest pending line accepted, in bytes
    pub max_line_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: None,
            initial_status: Some(DEFAULT_INITIAL_STATUS.to_string()),
            notify: NotifyMode::PerLine,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl SessionConfig {
    /// Enable the inter-chunk idle timeout
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Change the initial status message
    pub fn with_initial_status(mut self, status: Option<String>) -> Self {
        self.initial_status = status;
        self
    }

    /// Change the snapshot cadence
    pub fn with_notify(mut self, notify: NotifyMode) -> Self {
        self.notify = notify;
        self
    }

    /// Change the line length cap
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Idle timeout as a `Duration`
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> Result<()> {
        if self.idle_timeout_ms == Some(0) {
            return Err(Error::config("session.idle_timeout_ms must be positive"));
        }
        if self.max_line_bytes == 0 {
            return Err(Error::config("session.max_line_bytes must be positive"));
        }
        Ok(())
    }
}

/// Where the decoder finds identity and score inside a result's `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// JSON pointer to the numeric score
    pub score_pointer: String,
    /// JSON pointers tried in order for the identity
    pub identity_pointers: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            score_pointer: "/fitScore".to_string(),
            identity_pointers: vec![
                "/id".to_string(),
                "/company/cin".to_string(),
                "/company/id".to_string(),
            ],
        }
    }
}

impl DecoderConfig {
    fn validate(&self) -> Result<()> {
        if self.identity_pointers.is_empty() {
            return Err(Error::config("decoder.identity_pointers must not be empty"));
        }
        let pointers = std::iter::once(&self.score_pointer).chain(&self.identity_pointers);
        for pointer in pointers {
            if !pointer.starts_with('/') {
                return Err(Error::config(format!(
                    "decoder pointer {pointer:?} must start with '/'"
                )));
            }
        }
        Ok(())
    }
}
