//! Consensus configuration.

use serde::{Deserialize, Serialize};

/// Configuration for round quorum and outlier detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Minimum accepted votes before a round can reach consensus.
    pub quorum: usize,
    /// A vote is flagged as an outlier when any per-index value deviates
    /// from the round median by more than this percentage.
    pub outlier_threshold_percent: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            quorum: 6,
            outlier_threshold_percent: 50,
        }
    }
}
