//! # Integration Tests Crate
//!
//! Cross-crate tests that drive the assembled oracle node through whole
//! scenarios: registration, rotation, submission, consensus, and the
//! security gate reacting to hostile traffic.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! └── src/
//!     ├── lib.rs                 # This file + shared fixture
//!     ├── oracle_lifecycle.rs    # Registration, rotation, consensus flow
//!     └── security_scenarios.rs  # Replay, rate limiting, threat response
//! ```

pub mod oracle_lifecycle;
pub mod security_scenarios;

use fo_registry::NodeRole;
use fo_security::DevSignatureVerifier;
use node_runtime::{OracleConfig, OracleNode};
use shared_types::{InMemoryEventSink, ManualTimeSource, NodeId};
use std::sync::Arc;

/// An oracle node on a manual clock with a recording event sink.
pub struct TestCluster {
    pub node: OracleNode,
    pub clock: Arc<ManualTimeSource>,
    pub sink: Arc<InMemoryEventSink>,
}

impl TestCluster {
    pub fn new(config: OracleConfig) -> Self {
        let clock = Arc::new(ManualTimeSource::new(0));
        let sink = Arc::new(InMemoryEventSink::new());
        let node = OracleNode::new(
            config,
            Arc::new(DevSignatureVerifier::default()),
            clock.clone(),
            sink.clone(),
        );
        Self { node, clock, sink }
    }

    /// Default cluster: one submitter plus five validators, exactly
    /// quorum-many eligible voters.
    pub fn with_default_roster() -> Self {
        let cluster = Self::new(OracleConfig::default());
        for n in 1..=6 {
            cluster
                .node
                .registry()
                .register(node_id(n), vec![n as u8; 33])
                .unwrap();
        }
        cluster
            .node
            .scheduler()
            .activate(node_id(1), NodeRole::Submitter)
            .unwrap();
        for n in 2..=6 {
            cluster
                .node
                .scheduler()
                .activate(node_id(n), NodeRole::Validator)
                .unwrap();
        }
        cluster
    }
}

pub fn node_id(n: u64) -> NodeId {
    NodeId::from_low_u64(n)
}
