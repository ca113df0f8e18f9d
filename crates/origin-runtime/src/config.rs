//! Coordinator configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use origin_core::{OriginError, OriginResult, ProtocolVersion};

/// Log output settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    pub filter: String,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Coordinator configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Run the version handshake before admitting a participant
    pub perform_version_check: bool,
    /// Version announced in the handshake
    pub version: ProtocolVersion,
    /// Time a client gets to finish the handshake
    pub handshake_timeout_ms: u64,
    /// Bound of each connection's channels
    pub outbox_capacity: usize,
    pub logging: LoggingConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            perform_version_check: true,
            version: ProtocolVersion::current(),
            handshake_timeout_ms: 10_000,
            outbox_capacity: 256,
            logging: LoggingConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    pub fn from_json_str(json: &str) -> OriginResult<Self> {
        let config: CoordinatorConfig =
            serde_json::from_str(json).map_err(|e| OriginError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> OriginResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| OriginError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> OriginResult<()> {
        if self.outbox_capacity == 0 {
            return Err(OriginError::Config("outbox_capacity must be positive".into()));
        }
        if self.handshake_timeout_ms == 0 {
            return Err(OriginError::Config("handshake_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_version_check(mut self, enabled: bool) -> Self {
        self.perform_version_check = enabled;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout_ms = timeout.as_millis().max(1) as u64;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoordinatorConfig::default();
        assert!(config.perform_version_check);
        assert_eq!(config.version, ProtocolVersion::current());
        assert_eq!(config.handshake_timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CoordinatorConfig::from_json_str(
            r#"{ "perform_version_check": false, "version": "1.2.3", "logging": { "json": true } }"#,
        )
        .unwrap();

        assert!(!config.perform_version_check);
        assert_eq!(config.version, ProtocolVersion::new(1, 2, 3));
        assert_eq!(config.outbox_capacity, 256);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            CoordinatorConfig::from_json_str(r#"{ "outbox_capacity": 0 }"#),
            Err(OriginError::Config(_))
        ));
        assert!(matches!(
            CoordinatorConfig::from_json_str(r#"{ "version": "1.2" }"#),
            Err(OriginError::Config(_))
        ));
        assert!(CoordinatorConfig::from_json_file("/nonexistent/origins.json").is_err());
    }
}
