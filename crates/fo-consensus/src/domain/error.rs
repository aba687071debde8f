//! Error types for the consensus engine.

use shared_types::NodeId;

/// Consensus error types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Unknown round: {0}")]
    RoundNotFound(u64),

    #[error("Round {0} is no longer accepting votes")]
    RoundClosed(u64),

    #[error("Unauthorized voter: {0}")]
    UnauthorizedVoter(NodeId),

    #[error("Duplicate vote from {0}")]
    DuplicateVote(NodeId),

    #[error("Invalid submission data: {0}")]
    InvalidSubmissionData(&'static str),

    #[error("Consensus not reached for round {round}: {votes} of {required} votes")]
    ConsensusNotReached {
        round: u64,
        votes: usize,
        required: usize,
    },

    #[error("Round {0} already finalized")]
    AlreadyFinalized(u64),
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
