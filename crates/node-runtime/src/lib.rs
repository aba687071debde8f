//! # node-runtime
//!
//! Assembles the fee-oracle components into a running node.
//!
//! ## Modular structure
//!
//! - `config` - unified configuration with file and environment sources
//! - `adapters` - port implementations connecting the registry to the
//!   security gate and consensus engine
//! - `runtime` - `OracleNode` wiring, submission pipeline, and the
//!   rotation timer task
//!
//! ## Submission flow
//!
//! ```text
//! SubmissionEvent ──→ SecurityGate.admit ──→ ConsensusEngine.cast_vote
//!                                                     │
//!                       NodeRegistry ←── activity ────┘
//! ```

pub mod adapters;
pub mod config;
pub mod runtime;

pub use config::{ConfigError, OracleConfig, RuntimeConfig};
pub use runtime::{payload_digest, OracleError, OracleNode, SubmissionEvent};
