//! The rotation schedule record.
//!
//! Singleton owned by the `RotationScheduler`; mutated only by rotation
//! operations (scheduled rotate, force-rotate, failover).

use serde::{Deserialize, Serialize};
use shared_types::{NodeId, Timestamp};

/// Current submitter assignment and rotation timing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotationSchedule {
    /// Node currently privileged to originate primary submissions.
    pub current_submitter: Option<NodeId>,
    /// Pre-computed lookahead for the next rotation.
    pub next_submitter: Option<NodeId>,
    /// Earliest time the next scheduled rotation may run.
    pub rotation_at: Timestamp,
    /// Seconds between rotations.
    pub interval_secs: u64,
    /// Number of completed rotations.
    pub rotation_count: u64,
}

impl RotationSchedule {
    /// Whether the schedule has been seeded with a first submitter.
    pub fn is_seeded(&self) -> bool {
        self.current_submitter.is_some()
    }

    /// Seconds until the next scheduled rotation is allowed.
    pub fn remaining(&self, now: Timestamp) -> u64 {
        self.rotation_at.saturating_sub(now)
    }
}
