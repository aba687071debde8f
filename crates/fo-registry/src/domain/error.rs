//! Error types for the registry subsystem.

use super::NodeRole;
use shared_types::NodeId;

/// Registry and rotation error types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Node already registered: {0}")]
    AlreadyRegistered(NodeId),

    #[error("Unknown node: {0}")]
    NodeNotFound(NodeId),

    #[error("Node capacity exceeded: {capacity} nodes registered")]
    CapacityExceeded { capacity: usize },

    #[error("Insufficient active nodes: {active} active, minimum {minimum}")]
    InsufficientActiveNodes { active: usize, minimum: usize },

    #[error("No eligible submitter candidates")]
    NoEligibleSubmitters,

    #[error("No eligible backup nodes")]
    NoEligibleBackups,

    #[error("Rotation too early: {remaining_secs}s remaining")]
    RotationTooEarly { remaining_secs: u64 },

    #[error("Invalid role transition for {node}: {from:?} -> {to:?}")]
    InvalidRoleTransition {
        node: NodeId,
        from: NodeRole,
        to: NodeRole,
    },

    #[error("Node not suspended: {0}")]
    NotSuspended(NodeId),

    #[error("Rotation interval out of bounds: {secs}s (allowed {min}-{max})")]
    InvalidInterval { secs: u64, min: u64, max: u64 },

    #[error("Candidate below minimum reputation: {node} has {reputation}, minimum {minimum}")]
    BelowMinimumReputation {
        node: NodeId,
        reputation: u8,
        minimum: u8,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
