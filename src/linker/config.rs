use crate::error::{MeshError, Result};
use crate::protocol::MAX_DATAGRAM;

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Tunables for a linker node. Every field has a default, so an empty
/// TOML file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinkerConfig {
    /// How long a suspect has to answer a PING before it is declared dead.
    pub probe_timeout_ms: u64,
    /// Receive buffer size; larger datagrams are truncated and fail to decode.
    pub max_datagram: usize,
    /// Period of the registry stats log line. Zero disables it.
    pub stats_interval_secs: u64,
    /// Serve `/registry` and `/health` on this address when set.
    pub http_addr: Option<SocketAddr>,
    /// Filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 1000,
            max_datagram: MAX_DATAGRAM,
            stats_interval_secs: 30,
            http_addr: None,
            log_level: "info".to_string(),
        }
    }
}

impl LinkerConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MeshError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: LinkerConfig =
            toml::from_str(content).map_err(|e| MeshError::Config(e.to_string()))?;

        if config.probe_timeout_ms == 0 {
            return Err(MeshError::Config(
                "probe_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if config.max_datagram < 2 {
            return Err(MeshError::Config(
                "max_datagram must hold at least the envelope header".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_secs > 0).then(|| Duration::from_secs(self.stats_interval_secs))
    }
}
