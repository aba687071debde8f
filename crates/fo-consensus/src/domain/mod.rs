//! Domain entities for the consensus engine.

mod aggregation;
mod config;
mod error;
mod round;

pub use aggregation::{weighted_median, AggregationResult, RoundAggregate};
pub use config::ConsensusConfig;
pub use error::{ConsensusError, ConsensusResult};
pub use round::{Round, RoundState, Vote};
