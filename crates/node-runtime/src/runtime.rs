//! Oracle node wiring and background tasks.

use crate::adapters::{RegistryParticipant, RegistryReputationHook, RegistryVoterDirectory};
use crate::config::OracleConfig;
use fo_consensus::{ConsensusEngine, ConsensusError, ConsensusOutcome};
use fo_registry::{NodeRegistry, RegistryError, RotationScheduler};
use fo_security::{hash_payload, SecurityError, SecurityGate, SignatureVerifier};
use shared_types::{EventSink, FeeBps, Hash, NodeId, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Any failure surfaced by the submission pipeline.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),
}

/// A signed fee observation submitted by a reporting node.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SubmissionEvent {
    pub voter: NodeId,
    pub cex_fees: Vec<FeeBps>,
    pub dex_fees: Vec<FeeBps>,
    pub signature: Vec<u8>,
    pub payload_hash: Hash,
}

impl SubmissionEvent {
    /// Build a submission, deriving the payload hash from the canonical
    /// digest of its content.
    pub fn signed(
        round: u64,
        voter: NodeId,
        cex_fees: Vec<FeeBps>,
        dex_fees: Vec<FeeBps>,
        signature: Vec<u8>,
    ) -> Self {
        let payload_hash = payload_digest(round, voter, &cex_fees, &dex_fees);
        Self {
            voter,
            cex_fees,
            dex_fees,
            signature,
            payload_hash,
        }
    }
}

/// Canonical payload digest: SHA-256 over the round, voter, and both fee
/// vectors. The round is part of the digest, so identical fee vectors in
/// different rounds are distinct payloads for replay purposes.
pub fn payload_digest(round: u64, voter: NodeId, cex: &[FeeBps], dex: &[FeeBps]) -> Hash {
    let mut bytes = Vec::with_capacity(28 + (cex.len() + dex.len()) * 8);
    bytes.extend_from_slice(&round.to_be_bytes());
    bytes.extend_from_slice(&voter.0);
    for fee in cex {
        bytes.extend_from_slice(&fee.to_be_bytes());
    }
    for fee in dex {
        bytes.extend_from_slice(&fee.to_be_bytes());
    }
    hash_payload(&bytes)
}

/// The assembled oracle node: registry, rotation scheduler, security gate,
/// and consensus engine sharing one clock and one event sink.
pub struct OracleNode {
    config: OracleConfig,
    registry: Arc<NodeRegistry>,
    scheduler: Arc<RotationScheduler>,
    gate: Arc<SecurityGate>,
    engine: Arc<ConsensusEngine>,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl OracleNode {
    pub fn new(
        config: OracleConfig,
        verifier: Arc<dyn SignatureVerifier>,
        time: Arc<dyn TimeSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let registry = Arc::new(NodeRegistry::new(
            config.registry.clone(),
            Arc::clone(&time),
            Arc::clone(&events),
        ));
        let scheduler = Arc::new(RotationScheduler::new(
            Arc::clone(&registry),
            config.registry.clone(),
            Arc::clone(&time),
            Arc::clone(&events),
        ));
        let gate = Arc::new(SecurityGate::new(
            config.security.clone(),
            verifier,
            Arc::new(RegistryReputationHook::new(Arc::clone(&registry))),
            Arc::clone(&time),
            Arc::clone(&events),
        ));
        let engine = Arc::new(ConsensusEngine::new(
            config.consensus.clone(),
            Arc::new(RegistryVoterDirectory::new(Arc::clone(&registry))),
            Arc::new(RegistryParticipant::new(Arc::clone(&registry))),
            time,
            events,
        ));
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Self {
            config,
            registry,
            scheduler,
            gate,
            engine,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn scheduler(&self) -> &Arc<RotationScheduler> {
        &self.scheduler
    }

    pub fn gate(&self) -> &Arc<SecurityGate> {
        &self.gate
    }

    pub fn engine(&self) -> &Arc<ConsensusEngine> {
        &self.engine
    }

    // === SUBMISSION PIPELINE ===

    /// Run a submission through the full pipeline: security admission,
    /// vote casting, then activity bookkeeping for the voter.
    pub fn submit(&self, round: u64, submission: SubmissionEvent) -> Result<(), OracleError> {
        self.gate
            .admit(submission.voter, submission.payload_hash, &submission.signature)?;
        self.engine
            .cast_vote(round, submission.voter, submission.cex_fees, submission.dex_fees)?;
        self.registry.record_activity(submission.voter)?;
        Ok(())
    }

    /// Attempt consensus on a round. Quorum shortfall is a reported
    /// outcome; the round stays open for more submissions.
    pub fn try_consensus(&self, round: u64) -> Result<ConsensusOutcome, OracleError> {
        Ok(self.engine.process_consensus(round)?)
    }

    // === BACKGROUND TASKS ===

    /// Start the rotation timer and alert-maintenance tasks.
    pub fn start(&self) {
        info!("===========================================");
        info!("  Fee-Oracle Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            max_nodes = self.config.registry.max_nodes,
            quorum = self.config.consensus.quorum,
            rotation_interval_secs = self.config.registry.rotation_interval_secs,
            "node configured"
        );

        let tick = Duration::from_secs(self.config.runtime.rotation_tick_secs);

        let scheduler = Arc::clone(&self.scheduler);
        let mut rotation_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => tick_rotation(&scheduler),
                    _ = rotation_shutdown.changed() => {
                        info!("rotation timer stopped");
                        break;
                    }
                }
            }
        });

        let gate = Arc::clone(&self.gate);
        let retention = self.config.runtime.alert_retention_secs;
        let mut prune_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let pruned = gate.prune_alerts(retention);
                        if pruned > 0 {
                            debug!(pruned, "resolved threat alerts pruned");
                        }
                    }
                    _ = prune_shutdown.changed() => break,
                }
            }
        });

        info!("background tasks started");
    }

    /// Signal all background tasks to stop.
    pub fn shutdown(&self) {
        info!("initiating graceful shutdown");
        let _ = self.shutdown_tx.send(true);
    }
}

/// One rotation-timer tick. A rotation that is not yet due and an empty
/// candidate pool are both normal between-rotation conditions.
fn tick_rotation(scheduler: &RotationScheduler) {
    match scheduler.rotate() {
        Ok(next) => info!(submitter = %next, "scheduled rotation complete"),
        Err(RegistryError::RotationTooEarly { remaining_secs }) => {
            debug!(remaining_secs, "rotation not yet due");
        }
        Err(RegistryError::NoEligibleSubmitters) => {
            debug!("no eligible submitter candidates, rotation skipped");
        }
        Err(e) => warn!(error = %e, "scheduled rotation failed"),
    }
}
