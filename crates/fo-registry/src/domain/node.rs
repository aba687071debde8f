//! Node entity, role state machine, and performance metrics.

use serde::{Deserialize, Serialize};
use shared_types::{NodeId, Timestamp};

/// Maximum reputation / performance score.
pub const MAX_SCORE: u8 = 100;

/// Node role state machine.
///
/// `Inactive` is the post-registration state. A node holds exactly one role
/// at a time; `Suspended` is terminal unless an administrator reactivates
/// the node back to `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Inactive,
    Active,
    Submitter,
    Validator,
    Backup,
    Suspended,
}

impl NodeRole {
    /// Whether this role counts toward the generic active set.
    pub fn is_active(&self) -> bool {
        matches!(self, NodeRole::Active | NodeRole::Submitter | NodeRole::Validator)
    }
}

/// Rolling performance metrics for a node.
///
/// The derived score is a weighted blend: 40% submission success rate,
/// 30% reputation, 20% uptime, 10% inverse-latency bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub successful_submissions: u64,
    pub failed_submissions: u64,
    /// 80/20 exponential moving average of response time, milliseconds.
    pub avg_response_time_ms: u64,
    /// Whether any response time has been recorded yet.
    pub has_response_samples: bool,
    /// Uptime percentage (0-100).
    pub uptime_percent: u8,
    /// Duration of the most recent downtime, seconds.
    pub last_downtime_secs: u64,
    /// Cumulative downtime since registration, seconds.
    pub total_downtime_secs: u64,
    /// Derived performance score (0-100).
    pub score: u8,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            uptime_percent: 100,
            ..Default::default()
        }
    }

    /// Submission success rate as a percentage. No submissions yet counts
    /// as a clean record.
    pub fn success_rate(&self) -> u8 {
        let total = self.successful_submissions + self.failed_submissions;
        if total == 0 {
            return 100;
        }
        ((self.successful_submissions * 100) / total) as u8
    }

    /// Fold a response-time sample into the 80/20 moving average.
    pub fn record_response_time(&mut self, sample_ms: u64) {
        if self.has_response_samples {
            self.avg_response_time_ms = (self.avg_response_time_ms * 80 + sample_ms * 20) / 100;
        } else {
            self.avg_response_time_ms = sample_ms;
            self.has_response_samples = true;
        }
    }

    /// Latency bucket contribution: fast responders score high, no data
    /// contributes a flat 10 to the blended score.
    fn latency_bucket(&self) -> u32 {
        if !self.has_response_samples {
            return 100; // scaled by 10% below -> flat 10 contribution
        }
        match self.avg_response_time_ms {
            0..=999 => 100,
            1_000..=4_999 => 80,
            5_000..=9_999 => 60,
            _ => 40,
        }
    }

    /// Recompute the blended performance score.
    pub fn recompute_score(&mut self, reputation: u8) {
        let blended = u32::from(self.success_rate()) * 40
            + u32::from(reputation) * 30
            + u32::from(self.uptime_percent) * 20
            + self.latency_bucket() * 10;
        self.score = (blended / 100).min(u32::from(MAX_SCORE)) as u8;
    }
}

/// A registered reporting node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Public key material; empty is permitted.
    pub pubkey: Vec<u8>,
    pub role: NodeRole,
    /// Reputation score (0-100).
    pub reputation: u8,
    pub metrics: PerformanceMetrics,
    pub registered_at: Timestamp,
    pub last_active: Timestamp,
    pub submission_count: u64,
    pub consensus_participations: u64,
    pub is_backup: bool,
}

impl Node {
    pub fn new(id: NodeId, pubkey: Vec<u8>, reputation: u8, now: Timestamp) -> Self {
        let mut metrics = PerformanceMetrics::new();
        metrics.recompute_score(reputation);
        Self {
            id,
            pubkey,
            role: NodeRole::Inactive,
            reputation,
            metrics,
            registered_at: now,
            last_active: now,
            submission_count: 0,
            consensus_participations: 0,
            is_backup: false,
        }
    }

    /// Set reputation, clamped to [0, 100], and refresh the derived score.
    pub fn set_reputation(&mut self, reputation: u8) {
        self.reputation = reputation.min(MAX_SCORE);
        self.metrics.recompute_score(self.reputation);
    }

    /// Raise reputation by `delta`, capped at 100.
    pub fn reward_reputation(&mut self, delta: u8) {
        self.set_reputation(self.reputation.saturating_add(delta));
    }

    /// Lower reputation by `delta`, floored at 0.
    pub fn penalize_reputation(&mut self, delta: u8) {
        self.set_reputation(self.reputation.saturating_sub(delta));
    }

    /// Recompute uptime from cumulative downtime over the node's lifetime.
    pub fn record_downtime(&mut self, downtime_secs: u64, now: Timestamp) {
        self.metrics.last_downtime_secs = downtime_secs;
        self.metrics.total_downtime_secs += downtime_secs;

        let elapsed = now.saturating_sub(self.registered_at);
        if elapsed > 0 {
            let up = elapsed.saturating_sub(self.metrics.total_downtime_secs);
            self.metrics.uptime_percent = ((up * 100) / elapsed).min(100) as u8;
        }
        self.metrics.recompute_score(self.reputation);
    }
}
