//! # Node Configuration
//!
//! Unified configuration for all oracle components and runtime parameters.
//!
//! Sources, in increasing precedence: built-in defaults, a JSON config
//! file, `FO_*` environment variables.

use fo_consensus::ConsensusConfig;
use fo_registry::{RegistryConfig, RegistryError};
use fo_security::SecurityConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Complete node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Node registry and rotation configuration.
    pub registry: RegistryConfig,
    /// Security gate configuration.
    pub security: SecurityConfig,
    /// Consensus engine configuration.
    pub consensus: ConsensusConfig,
    /// Runtime loop configuration.
    pub runtime: RuntimeConfig,
}

/// Configuration for the runtime's background tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seconds between rotation-timer ticks. The scheduler itself decides
    /// whether a rotation is due; the tick only has to be finer than the
    /// rotation interval.
    pub rotation_tick_secs: u64,
    /// Resolved threat alerts older than this are pruned, seconds.
    pub alert_retention_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rotation_tick_secs: 10,
            alert_retention_secs: 86_400,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("consensus quorum must be at least 1")]
    ZeroQuorum,

    #[error("rotation tick must be at least 1 second")]
    ZeroRotationTick,
}

impl OracleConfig {
    /// Load configuration from a JSON file. Absent fields fall back to
    /// their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply `FO_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        override_from_env("FO_ROTATION_INTERVAL_SECS", &mut self.registry.rotation_interval_secs);
        override_from_env("FO_MAX_NODES", &mut self.registry.max_nodes);
        override_from_env("FO_QUORUM", &mut self.consensus.quorum);
        override_from_env("FO_RATE_LIMIT_MAX", &mut self.security.rate_limit_max);
        override_from_env("FO_ROTATION_TICK_SECS", &mut self.runtime.rotation_tick_secs);
    }

    /// Validate configured bounds across all components.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry.validate()?;
        if self.consensus.quorum == 0 {
            return Err(ConfigError::ZeroQuorum);
        }
        if self.runtime.rotation_tick_secs == 0 {
            return Err(ConfigError::ZeroRotationTick);
        }
        Ok(())
    }
}

fn override_from_env<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(var) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(var, raw, "ignoring unparseable environment override"),
        }
    }
}
