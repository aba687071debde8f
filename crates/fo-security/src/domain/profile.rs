//! Per-node security profile.

use shared_types::{Hash, Timestamp};
use std::collections::HashSet;

/// Rate-limit, replay, and abuse state for a single node.
///
/// The seen-hash set is deliberately unbounded in time: a replayed payload
/// must be rejected on its second occurrence regardless of how long ago
/// the first was seen. With a bounded node set and an hourly rate ceiling
/// the set grows slowly enough to hold in memory.
#[derive(Debug, Clone, Default)]
pub struct SecurityProfile {
    /// Submissions accepted in the current rate window.
    pub window_count: u32,
    /// When the current rate window resets.
    pub window_reset_at: Timestamp,
    /// Rejected admission attempts (any reason).
    pub failed_attempts: u32,
    /// Replay offenses; drives auto-blacklisting.
    pub replay_offenses: u32,
    /// Payload hashes already accepted from this node.
    pub seen_hashes: HashSet<Hash>,
    /// Lockout expiry after exceeding the rate ceiling.
    pub locked_until: Timestamp,
    /// Total admitted submissions.
    pub total_submissions: u64,
    /// Time of the last admitted submission.
    pub last_submission: Timestamp,
}

impl SecurityProfile {
    /// Whether the node is locked out at `now`.
    pub fn is_locked(&self, now: Timestamp) -> bool {
        now < self.locked_until
    }

    /// Roll the rate window forward if it has elapsed.
    pub fn roll_window(&mut self, now: Timestamp, window_secs: u64) {
        if now >= self.window_reset_at {
            self.window_count = 0;
            self.window_reset_at = now + window_secs;
        }
    }
}
