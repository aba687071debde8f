//! Error types for the security gate.

use shared_types::{NodeId, Timestamp};

/// Admission rejection and security error types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SecurityError {
    #[error("Node is blacklisted: {0}")]
    Blacklisted(NodeId),

    #[error("Replay detected from {node}")]
    ReplayDetected { node: NodeId },

    #[error("Invalid signature from {0}")]
    InvalidSignature(NodeId),

    #[error("Rate limited: {node} may retry at {retry_at}")]
    RateLimited { node: NodeId, retry_at: Timestamp },

    #[error("Admission paused system-wide (under attack)")]
    SystemPaused,

    #[error("Invalid threat level: {0} (maximum 5)")]
    InvalidThreatLevel(u8),

    #[error("Unknown alert: {0}")]
    AlertNotFound(u64),
}

/// Result type for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;
