//! Port implementations connecting the registry to the security gate and
//! consensus engine.
//!
//! All three adapters wrap the shared `NodeRegistry`. Reports about nodes
//! the registry no longer knows are dropped; the consequence of a missing
//! node is already handled wherever the node was removed.

use fo_consensus::{ConsensusParticipant, VoterDirectory};
use fo_registry::NodeRegistry;
use fo_security::ReputationHook;
use shared_types::NodeId;
use std::sync::Arc;
use tracing::debug;

/// Registry-backed voter directory: eligibility and weights come from the
/// node's role and reputation.
pub struct RegistryVoterDirectory {
    registry: Arc<NodeRegistry>,
}

impl RegistryVoterDirectory {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self { registry }
    }
}

impl VoterDirectory for RegistryVoterDirectory {
    fn vote_weight(&self, node: NodeId) -> Option<u64> {
        self.registry.vote_weight(node)
    }
}

/// Feeds consensus participation outcomes back into node reputation and
/// performance metrics.
pub struct RegistryParticipant {
    registry: Arc<NodeRegistry>,
}

impl RegistryParticipant {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self { registry }
    }
}

impl ConsensusParticipant for RegistryParticipant {
    fn record_participation(&self, node: NodeId) {
        if self.registry.record_consensus_participation(node).is_err() {
            debug!(node = %node, "participation report for unknown node dropped");
        }
    }

    fn record_outlier(&self, node: NodeId) {
        if self.registry.record_failed_submission(node).is_err() {
            debug!(node = %node, "outlier report for unknown node dropped");
        }
    }
}

/// Applies the reputation consequence of gate rejections.
pub struct RegistryReputationHook {
    registry: Arc<NodeRegistry>,
}

impl RegistryReputationHook {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self { registry }
    }
}

impl ReputationHook for RegistryReputationHook {
    fn record_failed_attempt(&self, node: NodeId) {
        if self.registry.record_failed_submission(node).is_err() {
            debug!(node = %node, "failed-attempt report for unknown node dropped");
        }
    }
}
