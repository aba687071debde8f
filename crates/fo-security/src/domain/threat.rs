//! Global threat state and alert records.

use serde::{Deserialize, Serialize};
use shared_types::{NodeId, Timestamp};

/// Upper bound of the threat-level scale.
pub const MAX_THREAT_LEVEL: u8 = 5;

/// An auditable security alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAlert {
    pub id: u64,
    pub node: NodeId,
    pub reason: String,
    /// Severity 1-5.
    pub severity: u8,
    pub resolved: bool,
    pub raised_at: Timestamp,
}

/// Global escalation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreatState {
    /// Threat level 0-5.
    pub level: u8,
    /// Set when the level reaches the maximum.
    pub under_attack: bool,
    /// While paused, all admission is rejected.
    pub paused: bool,
    pub alerts: Vec<ThreatAlert>,
}

impl ThreatState {
    /// Raise the level by one, saturating at the maximum.
    pub fn escalate(&mut self) -> u8 {
        self.level = (self.level + 1).min(MAX_THREAT_LEVEL);
        self.level
    }
}
