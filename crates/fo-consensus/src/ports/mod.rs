//! Ports for consensus-engine collaborators.

use shared_types::NodeId;

/// Voter eligibility and weights, provided by the node registry.
pub trait VoterDirectory: Send + Sync {
    /// Weight for an eligible voter, `None` if the node may not vote.
    /// Non-zero for any eligible voter, monotonic in reputation.
    fn vote_weight(&self, node: NodeId) -> Option<u64>;
}

/// Participation outcomes reported back to the node registry at
/// finalization.
pub trait ConsensusParticipant: Send + Sync {
    /// The node's vote contributed to a finalized aggregate.
    fn record_participation(&self, node: NodeId);

    /// The node's vote was flagged as an outlier.
    fn record_outlier(&self, node: NodeId);
}

/// Static in-memory directory for tests and standalone use.
pub struct StaticVoterDirectory {
    weights: parking_lot::RwLock<std::collections::HashMap<NodeId, u64>>,
}

impl StaticVoterDirectory {
    pub fn new() -> Self {
        Self {
            weights: parking_lot::RwLock::new(std::collections::HashMap::new()),
        }
    }

    pub fn set_weight(&self, node: NodeId, weight: u64) {
        self.weights.write().insert(node, weight);
    }

    pub fn remove(&self, node: NodeId) {
        self.weights.write().remove(&node);
    }
}

impl Default for StaticVoterDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl VoterDirectory for StaticVoterDirectory {
    fn vote_weight(&self, node: NodeId) -> Option<u64> {
        self.weights.read().get(&node).copied()
    }
}

/// Participant hook that records nothing.
pub struct NullParticipant;

impl ConsensusParticipant for NullParticipant {
    fn record_participation(&self, _node: NodeId) {}
    fn record_outlier(&self, _node: NodeId) {}
}
