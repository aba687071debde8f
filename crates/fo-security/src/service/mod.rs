//! Security gate service.


use crate::domain::{
    SecurityConfig, SecurityError, SecurityProfile, SecurityResult, ThreatAlert, ThreatState,
    MAX_THREAT_LEVEL,
};
use crate::ports::{ReputationHook, SignatureVerifier};
use dashmap::DashMap;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use shared_types::{EventSink, Hash, NodeId, OracleEvent, TimeSource, Timestamp};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// SHA-256 payload hash used for replay detection.
pub fn hash_payload(bytes: &[u8]) -> Hash {
    let digest = Sha256::digest(bytes);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    hash
}

/// Admission control in front of the consensus engine.
///
/// Per-node profiles live in a sharded map: admission for one node is
/// serialized on its shard while other nodes proceed in parallel. Threat
/// state and the blacklist are global and guarded separately.
pub struct SecurityGate {
    profiles: DashMap<NodeId, SecurityProfile>,
    threat: RwLock<ThreatState>,
    blacklist: RwLock<BTreeSet<NodeId>>,
    alert_seq: AtomicU64,
    verifier: Arc<dyn SignatureVerifier>,
    reputation: Arc<dyn ReputationHook>,
    config: SecurityConfig,
    time: Arc<dyn TimeSource>,
    events: Arc<dyn EventSink>,
}

impl SecurityGate {
    pub fn new(
        config: SecurityConfig,
        verifier: Arc<dyn SignatureVerifier>,
        reputation: Arc<dyn ReputationHook>,
        time: Arc<dyn TimeSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            profiles: DashMap::new(),
            threat: RwLock::new(ThreatState::default()),
            blacklist: RwLock::new(BTreeSet::new()),
            alert_seq: AtomicU64::new(0),
            verifier,
            reputation,
            config,
            time,
            events,
        }
    }

    // === ADMISSION ===

    /// Admit or reject a candidate submission. On success the node's
    /// submission counters are updated and the payload hash is recorded
    /// for replay detection.
    pub fn admit(
        &self,
        node: NodeId,
        payload_hash: Hash,
        signature: &[u8],
    ) -> SecurityResult<()> {
        if self.blacklist.read().contains(&node) {
            self.note_failure(node);
            return Err(SecurityError::Blacklisted(node));
        }
        if self.threat.read().paused {
            return Err(SecurityError::SystemPaused);
        }

        let now = self.time.now();
        let mut profile = self.profiles.entry(node).or_default();

        // Replay check: a hash seen before from this node is always
        // rejected, no matter how much time has passed.
        if profile.seen_hashes.contains(&payload_hash) {
            profile.failed_attempts += 1;
            profile.replay_offenses += 1;
            let offenses = profile.replay_offenses;
            drop(profile);

            warn!(node = %node, offenses, "replayed payload rejected");
            self.events
                .publish(OracleEvent::ReplayRejected { node, payload_hash });
            self.raise_alert(node, "replayed submission payload", 4);
            self.escalate_threat();
            if offenses >= self.config.auto_blacklist_offenses {
                self.blacklist_node(node, "repeated replay offenses");
            }
            self.reputation.record_failed_attempt(node);
            return Err(SecurityError::ReplayDetected { node });
        }

        if !self.verifier.verify(node, &payload_hash, signature) {
            profile.failed_attempts += 1;
            drop(profile);
            self.reputation.record_failed_attempt(node);
            return Err(SecurityError::InvalidSignature(node));
        }

        if profile.is_locked(now) {
            let retry_at = profile.locked_until;
            profile.failed_attempts += 1;
            drop(profile);
            self.reputation.record_failed_attempt(node);
            return Err(SecurityError::RateLimited { node, retry_at });
        }

        profile.roll_window(now, self.config.rate_window_secs);
        if profile.window_count >= self.config.rate_limit_max {
            profile.failed_attempts += 1;
            profile.locked_until = now + self.config.lockout_secs;
            let retry_at = profile.locked_until;
            drop(profile);

            warn!(node = %node, retry_at, "rate ceiling exceeded, node locked out");
            self.raise_alert(node, "rate limit exceeded", 2);
            self.reputation.record_failed_attempt(node);
            return Err(SecurityError::RateLimited { node, retry_at });
        }

        profile.window_count += 1;
        profile.total_submissions += 1;
        profile.last_submission = now;
        profile.seen_hashes.insert(payload_hash);
        drop(profile);

        debug!(node = %node, "submission admitted");
        self.events
            .publish(OracleEvent::SubmissionAdmitted { node, payload_hash });
        Ok(())
    }

    // === BLACKLIST ===

    pub fn blacklist_node(&self, node: NodeId, reason: &str) {
        let inserted = self.blacklist.write().insert(node);
        if inserted {
            warn!(node = %node, reason, "node blacklisted");
            self.events.publish(OracleEvent::NodeBlacklisted {
                node,
                reason: reason.to_string(),
            });
        }
    }

    /// Administrative removal from the blacklist (temporary exclusions).
    pub fn unblacklist_node(&self, node: NodeId) -> bool {
        self.blacklist.write().remove(&node)
    }

    pub fn is_blacklisted(&self, node: NodeId) -> bool {
        self.blacklist.read().contains(&node)
    }

    // === THREAT STATE ===

    /// Raise the threat level by one, pausing admission at the maximum.
    pub fn escalate_threat(&self) -> u8 {
        let mut threat = self.threat.write();
        let level = threat.escalate();
        self.after_level_change(&mut threat);
        drop(threat);

        self.events.publish(OracleEvent::ThreatLevelChanged { level });
        level
    }

    /// Set the threat level outright (privileged).
    pub fn set_threat_level(&self, level: u8) -> SecurityResult<()> {
        if level > MAX_THREAT_LEVEL {
            return Err(SecurityError::InvalidThreatLevel(level));
        }
        let mut threat = self.threat.write();
        threat.level = level;
        self.after_level_change(&mut threat);
        drop(threat);

        self.events.publish(OracleEvent::ThreatLevelChanged { level });
        Ok(())
    }

    /// Administrator reset: clears the level, the under-attack flag, and
    /// the system-wide pause. The only way out of a full pause.
    pub fn reset_threat(&self) {
        let mut threat = self.threat.write();
        let was_paused = threat.paused;
        threat.level = 0;
        threat.under_attack = false;
        threat.paused = false;
        drop(threat);

        info!("threat state reset by administrator");
        self.events.publish(OracleEvent::ThreatLevelChanged { level: 0 });
        if was_paused {
            self.events.publish(OracleEvent::SystemResumed);
        }
    }

    fn after_level_change(&self, threat: &mut ThreatState) {
        if threat.level >= self.config.auto_pause_level && !threat.paused {
            threat.under_attack = true;
            threat.paused = true;
            warn!(level = threat.level, "threat level at maximum, pausing admission");
            self.events.publish(OracleEvent::SystemPaused);
        }
    }

    pub fn threat_level(&self) -> u8 {
        self.threat.read().level
    }

    pub fn is_paused(&self) -> bool {
        self.threat.read().paused
    }

    // === ALERTS ===

    /// Record an auditable alert and publish a `ThreatDetected` event.
    pub fn raise_alert(&self, node: NodeId, reason: &str, severity: u8) -> u64 {
        let id = self.alert_seq.fetch_add(1, Ordering::Relaxed);
        let alert = ThreatAlert {
            id,
            node,
            reason: reason.to_string(),
            severity,
            resolved: false,
            raised_at: self.time.now(),
        };
        self.threat.write().alerts.push(alert);

        self.events.publish(OracleEvent::ThreatDetected {
            node,
            reason: reason.to_string(),
            severity,
        });
        id
    }

    /// Mark a single alert resolved.
    pub fn resolve_alert(&self, id: u64) -> SecurityResult<()> {
        let mut threat = self.threat.write();
        let alert = threat
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SecurityError::AlertNotFound(id))?;
        alert.resolved = true;
        Ok(())
    }

    /// Drop alerts raised more than `max_age_secs` ago. Returns the number
    /// pruned.
    pub fn prune_alerts(&self, max_age_secs: u64) -> usize {
        let cutoff = self.time.now().saturating_sub(max_age_secs);
        let mut threat = self.threat.write();
        let before = threat.alerts.len();
        threat.alerts.retain(|a| a.raised_at >= cutoff);
        before - threat.alerts.len()
    }

    pub fn alerts(&self) -> Vec<ThreatAlert> {
        self.threat.read().alerts.clone()
    }

    // === QUERIES ===

    /// Snapshot of a node's security profile, if any submissions were seen.
    pub fn profile(&self, node: NodeId) -> Option<SecurityProfile> {
        self.profiles.get(&node).map(|p| p.clone())
    }

    /// Earliest time a locked-out node may retry, if locked.
    pub fn locked_until(&self, node: NodeId) -> Option<Timestamp> {
        let profile = self.profiles.get(&node)?;
        let now = self.time.now();
        profile.is_locked(now).then_some(profile.locked_until)
    }

    fn note_failure(&self, node: NodeId) {
        if let Some(mut profile) = self.profiles.get_mut(&node) {
            profile.failed_attempts += 1;
        }
        self.reputation.record_failed_attempt(node);
    }
}
