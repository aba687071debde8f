//! # fo-consensus
//!
//! Consensus engine for the fee-oracle core: collects weighted fee votes
//! into rounds, checks quorum, aggregates per-index weighted medians, and
//! flags outlier voters.
//!
//! ## Round lifecycle
//!
//! ```text
//! Open -> ThresholdReached -> Finalized
//!   ^            |
//!   +-- reset ---+
//! ```
//!
//! Quorum shortfall is a reported outcome (`ConsensusOutcome::Failed`),
//! not an error: the round stays open and later votes can still carry it
//! over the threshold. A finalized round is immutable.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    weighted_median, AggregationResult, ConsensusConfig, ConsensusError, ConsensusResult, Round,
    RoundAggregate, RoundState, Vote,
};
pub use ports::{ConsensusParticipant, NullParticipant, StaticVoterDirectory, VoterDirectory};
pub use service::{ConsensusEngine, ConsensusOutcome};
