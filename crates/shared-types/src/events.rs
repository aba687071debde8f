//! # Oracle Events
//!
//! The audit-log event taxonomy published by the core subsystems, plus the
//! `EventSink` port they publish through.
//!
//! Events form an append-only log handed to an injected sink so external
//! consumers (and tests) can observe every state transition.

use crate::entities::{FeeBps, Hash, NodeId, Timestamp};
use serde::{Deserialize, Serialize};

/// All events published by the oracle core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OracleEvent {
    // =========================================================================
    // NODE REGISTRY
    // =========================================================================
    /// A node was registered and entered the Inactive state.
    NodeRegistered { node: NodeId, registered_at: Timestamp },

    /// A node was activated into a role.
    NodeActivated { node: NodeId, role: String },

    /// A node was deactivated.
    NodeDeactivated { node: NodeId },

    /// A node was suspended with a reputation penalty.
    NodeSuspended { node: NodeId, reason: String },

    /// A suspended node was reactivated by an administrator.
    NodeReactivated { node: NodeId },

    /// A backup node was promoted to Validator after a node failure.
    BackupActivated { backup: NodeId, failed: NodeId },

    // =========================================================================
    // ROTATION SCHEDULER
    // =========================================================================
    /// The submitter role rotated to a new node.
    SubmitterRotated {
        previous: Option<NodeId>,
        current: NodeId,
        rotation_count: u64,
    },

    // =========================================================================
    // CONSENSUS ENGINE
    // =========================================================================
    /// A vote was accepted into a round.
    VoteCast { round: u64, voter: NodeId, weight: u64 },

    /// A round reached quorum and its aggregate was computed.
    ConsensusReached {
        round: u64,
        participants: usize,
        confidence: u8,
    },

    /// A consensus attempt fell short of quorum. Reported outcome, not an
    /// error: the round stays open for more votes.
    ConsensusFailed { round: u64, votes: usize, required: usize },

    /// A round was finalized into an immutable aggregation result.
    RoundFinalized { round: u64, finalized_at: Timestamp },

    /// A round was administratively reset to a fresh open state.
    RoundReset { round: u64 },

    // =========================================================================
    // SECURITY GATE
    // =========================================================================
    /// A threat was detected and an alert recorded.
    ThreatDetected {
        node: NodeId,
        reason: String,
        severity: u8,
    },

    /// The global threat level changed.
    ThreatLevelChanged { level: u8 },

    /// A node was blacklisted.
    NodeBlacklisted { node: NodeId, reason: String },

    /// Admission was paused system-wide (threat level at maximum).
    SystemPaused,

    /// Admission resumed after an administrative reset.
    SystemResumed,

    /// A replayed payload hash was rejected.
    ReplayRejected { node: NodeId, payload_hash: Hash },

    /// An admitted submission entered the consensus pipeline.
    SubmissionAdmitted { node: NodeId, payload_hash: Hash },

    /// A fee observation snapshot attached to a finalized round.
    AggregatePublished {
        round: u64,
        cex_fees: Vec<FeeBps>,
        dex_fees: Vec<FeeBps>,
    },
}

/// Port for publishing oracle events.
///
/// Implementations must be cheap and non-blocking; the core never awaits
/// network I/O while holding component locks.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: OracleEvent);
}

/// In-memory event sink adapter for tests and audit inspection.
pub struct InMemoryEventSink {
    events: parking_lot::RwLock<Vec<OracleEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self {
            events: parking_lot::RwLock::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<OracleEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

impl Default for InMemoryEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for InMemoryEventSink {
    fn publish(&self, event: OracleEvent) {
        self.events.write().push(event);
    }
}

/// Sink that discards all events.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _event: OracleEvent) {}
}
