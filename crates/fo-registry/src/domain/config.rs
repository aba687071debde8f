//! Registry configuration.

use super::{RegistryError, RegistryResult};

/// Rotation interval bounds in seconds.
pub const MIN_ROTATION_INTERVAL_SECS: u64 = 60;
pub const MAX_ROTATION_INTERVAL_SECS: u64 = 3_600;

/// Configuration for the node registry and rotation scheduler.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RegistryConfig {
    /// Hard cap on registered nodes.
    pub max_nodes: usize,
    /// Minimum number of nodes that must stay in the generic active set.
    pub min_active_nodes: usize,
    /// Reputation floor for submitter/backup eligibility.
    pub min_eligible_reputation: u8,
    /// Reputation assigned at registration.
    pub initial_reputation: u8,
    /// Seconds between scheduled submitter rotations.
    pub rotation_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_nodes: 10,
            min_active_nodes: 1,
            min_eligible_reputation: 50,
            initial_reputation: 75,
            rotation_interval_secs: 300,
        }
    }
}

impl RegistryConfig {
    /// Validate configured bounds.
    pub fn validate(&self) -> RegistryResult<()> {
        if self.rotation_interval_secs < MIN_ROTATION_INTERVAL_SECS
            || self.rotation_interval_secs > MAX_ROTATION_INTERVAL_SECS
        {
            return Err(RegistryError::InvalidInterval {
                secs: self.rotation_interval_secs,
                min: MIN_ROTATION_INTERVAL_SECS,
                max: MAX_ROTATION_INTERVAL_SECS,
            });
        }
        Ok(())
    }
}
