//! Round and vote entities.

use super::{AggregationResult, RoundAggregate};
use serde::{Deserialize, Serialize};
use shared_types::{FeeBps, NodeId, Timestamp};

/// Round lifecycle.
///
/// ```text
/// Open -> ThresholdReached -> Finalized
///   ^            |
///   +-- reset ---+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    Open,
    ThresholdReached,
    Finalized,
}

/// A recorded fee observation. Immutable once accepted; at most one per
/// voter per round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub voter: NodeId,
    pub cex_fees: Vec<FeeBps>,
    pub dex_fees: Vec<FeeBps>,
    /// Weight derived from the voter's reputation at cast time.
    pub weight: u64,
    pub cast_at: Timestamp,
}

/// One aggregation cycle.
#[derive(Debug, Clone)]
pub struct Round {
    pub id: u64,
    pub state: RoundState,
    pub started_at: Timestamp,
    /// Votes in insertion order (preserved for audit).
    pub votes: Vec<Vote>,
    pub consensus_reached: bool,
    /// Aggregate computed at threshold; stamped into a result at finalize.
    pub pending: Option<RoundAggregate>,
    /// Immutable once set.
    pub result: Option<AggregationResult>,
}

impl Round {
    pub fn new(id: u64, now: Timestamp) -> Self {
        Self {
            id,
            state: RoundState::Open,
            started_at: now,
            votes: Vec::new(),
            consensus_reached: false,
            pending: None,
            result: None,
        }
    }

    pub fn has_voted(&self, voter: NodeId) -> bool {
        self.votes.iter().any(|v| v.voter == voter)
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    /// Clear all votes and return to a fresh open state.
    pub fn reset(&mut self, now: Timestamp) {
        self.state = RoundState::Open;
        self.started_at = now;
        self.votes.clear();
        self.consensus_reached = false;
        self.pending = None;
    }
}
