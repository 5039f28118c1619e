//! Server settings.
//!
//! Two layers, in priority order: compiled defaults, then `TERMCAST_*`
//! environment variable overrides. There is no settings file — the server
//! carries no durable state at all, so configuration stays equally
//! ephemeral.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use termcast_core::TermcastError;

/// Runtime configuration for the server binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Heartbeat tick interval in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Bounded per-connection send buffer, in frames.
    pub sink_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8787,
            heartbeat_interval_ms: 30_000,
            sink_capacity: 256,
        }
    }
}

impl ServerSettings {
    /// Load settings: defaults overridden by `TERMCAST_*` env vars.
    pub fn load() -> Result<Self, TermcastError> {
        let mut settings = Self::default();
        if let Ok(host) = std::env::var("TERMCAST_HOST") {
            settings.host = host;
        }
        if let Ok(port) = std::env::var("TERMCAST_PORT") {
            settings.port = port
                .parse()
                .map_err(|_| TermcastError::Config(format!("invalid TERMCAST_PORT: {port}")))?;
        }
        if let Ok(ms) = std::env::var("TERMCAST_HEARTBEAT_INTERVAL_MS") {
            settings.heartbeat_interval_ms = ms.parse().map_err(|_| {
                TermcastError::Config(format!("invalid TERMCAST_HEARTBEAT_INTERVAL_MS: {ms}"))
            })?;
        }
        if let Ok(cap) = std::env::var("TERMCAST_SINK_CAPACITY") {
            settings.sink_capacity = cap
                .parse()
                .map_err(|_| TermcastError::Config(format!("invalid TERMCAST_SINK_CAPACITY: {cap}")))?;
        }
        Ok(settings)
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Heartbeat interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ServerSettings::default();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8787");
        assert_eq!(settings.heartbeat_interval(), Duration::from_secs(30));
        assert_eq!(settings.sink_capacity, 256);
    }

    #[test]
    fn deserialize_partial_uses_defaults() {
        let settings: ServerSettings = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.heartbeat_interval_ms, 30_000);
    }
}
