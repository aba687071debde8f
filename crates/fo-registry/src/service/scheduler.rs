//! Rotation scheduler service.
//!
//! Owns the single `RotationSchedule` record and every operation that can
//! change who holds the submitter seat. Lifecycle operations that may
//! displace the current submitter (deactivation, suspension, backup
//! failover) are exposed here so that losing the submitter always triggers
//! an unconditional failover rotation in the same call.

use crate::domain::{
    NodeRole, RegistryConfig, RegistryError, RegistryResult, RotationSchedule,
    MAX_ROTATION_INTERVAL_SECS, MIN_ROTATION_INTERVAL_SECS,
};
use crate::service::NodeRegistry;
use parking_lot::RwLock;
use shared_types::{EventSink, NodeId, OracleEvent, TimeSource};
use std::sync::Arc;
use tracing::{info, warn};

pub struct RotationScheduler {
    registry: Arc<NodeRegistry>,
    schedule: RwLock<RotationSchedule>,
    config: RegistryConfig,
    time: Arc<dyn TimeSource>,
    events: Arc<dyn EventSink>,
}

impl RotationScheduler {
    pub fn new(
        registry: Arc<NodeRegistry>,
        config: RegistryConfig,
        time: Arc<dyn TimeSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let schedule = RotationSchedule {
            interval_secs: config.rotation_interval_secs,
            ..Default::default()
        };
        Self {
            registry,
            schedule: RwLock::new(schedule),
            config,
            time,
            events,
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Snapshot of the current schedule.
    pub fn schedule(&self) -> RotationSchedule {
        self.schedule.read().clone()
    }

    /// Privileged runtime reconfiguration of the rotation interval.
    pub fn set_interval(&self, secs: u64) -> RegistryResult<()> {
        if !(MIN_ROTATION_INTERVAL_SECS..=MAX_ROTATION_INTERVAL_SECS).contains(&secs) {
            return Err(RegistryError::InvalidInterval {
                secs,
                min: MIN_ROTATION_INTERVAL_SECS,
                max: MAX_ROTATION_INTERVAL_SECS,
            });
        }
        self.schedule.write().interval_secs = secs;
        Ok(())
    }

    // === LIFECYCLE (rotation-coupled) ===

    /// Activate a node into a role. Activating the first submitter seeds
    /// the rotation schedule.
    pub fn activate(&self, id: NodeId, role: NodeRole) -> RegistryResult<()> {
        self.registry.activate_role(id, role)?;

        if role == NodeRole::Submitter {
            let now = self.time.now();
            let mut sched = self.schedule.write();
            if !sched.is_seeded() {
                sched.current_submitter = Some(id);
                sched.rotation_at = now + sched.interval_secs;
                sched.next_submitter = self.registry.best_submitter_candidate();
                info!(submitter = %id, rotation_at = sched.rotation_at, "rotation schedule seeded");
            }
        }
        Ok(())
    }

    /// Deactivate a node. Deactivating the current submitter triggers an
    /// unconditional failover rotation.
    pub fn deactivate(&self, id: NodeId) -> RegistryResult<()> {
        let was_submitter = self.registry.deactivate_node(id)?;
        if was_submitter {
            self.failover();
        }
        Ok(())
    }

    /// Suspend a node (-20 reputation). Suspending the current submitter
    /// triggers an unconditional failover rotation.
    pub fn suspend(&self, id: NodeId, reason: &str) -> RegistryResult<()> {
        let was_submitter = self.registry.suspend_node(id, reason, 20)?;
        if was_submitter {
            self.failover();
        }
        Ok(())
    }

    /// Promote the first eligible backup to Validator and suspend the
    /// failed node (-30 reputation), failing over if it held the seat.
    pub fn activate_backup(&self, failed: NodeId) -> RegistryResult<NodeId> {
        let (backup, failed_was_submitter) = self.registry.promote_backup(failed)?;
        if failed_was_submitter {
            self.failover();
        }
        Ok(backup)
    }

    // === ROTATION ===

    /// Scheduled rotation. Callable only once the rotation time has
    /// elapsed; selects the eligible Validator with the strictly highest
    /// reputation (ties to the lowest node ID).
    pub fn rotate(&self) -> RegistryResult<NodeId> {
        let now = self.time.now();
        let mut sched = self.schedule.write();

        if now < sched.rotation_at {
            return Err(RegistryError::RotationTooEarly {
                remaining_secs: sched.remaining(now),
            });
        }

        let candidate = self
            .registry
            .best_submitter_candidate()
            .ok_or(RegistryError::NoEligibleSubmitters)?;

        self.install_submitter(&mut sched, candidate, now)?;
        Ok(candidate)
    }

    /// Administrative rotation override. Bypasses timing, but the target
    /// must still meet the minimum reputation bar and hold an active role.
    pub fn force_rotate(&self, target: NodeId) -> RegistryResult<()> {
        let reputation = self.registry.reputation(target)?;
        if reputation < self.config.min_eligible_reputation {
            return Err(RegistryError::BelowMinimumReputation {
                node: target,
                reputation,
                minimum: self.config.min_eligible_reputation,
            });
        }
        let role = self.registry.role(target)?;
        if !matches!(role, NodeRole::Validator | NodeRole::Active) {
            return Err(RegistryError::InvalidRoleTransition {
                node: target,
                from: role,
                to: NodeRole::Submitter,
            });
        }

        let now = self.time.now();
        let mut sched = self.schedule.write();
        self.install_submitter(&mut sched, target, now)?;
        warn!(target = %target, "forced submitter rotation");
        Ok(())
    }

    /// Unconditional rotation after the submitter was deactivated or
    /// suspended. If no candidate qualifies the seat is left explicitly
    /// empty rather than pointing at a dead node; the next scheduled
    /// rotation (or an administrative force-rotation) refills it.
    fn failover(&self) {
        let now = self.time.now();
        let mut sched = self.schedule.write();

        match self.registry.best_submitter_candidate() {
            Some(candidate) => {
                if let Err(err) = self.install_submitter(&mut sched, candidate, now) {
                    warn!(%err, "failover rotation failed");
                }
            }
            None => {
                warn!("submitter lost with no eligible successor");
                sched.current_submitter = None;
                sched.next_submitter = None;
                sched.rotation_at = now + sched.interval_secs;
            }
        }
    }

    /// Demote the current submitter to Validator, promote `candidate`, and
    /// advance the schedule by one interval.
    fn install_submitter(
        &self,
        sched: &mut RotationSchedule,
        candidate: NodeId,
        now: u64,
    ) -> RegistryResult<()> {
        let previous = sched.current_submitter;
        if let Some(prev) = previous {
            if prev != candidate && self.registry.role(prev) == Ok(NodeRole::Submitter) {
                self.registry.activate_role(prev, NodeRole::Validator)?;
            }
        }
        self.registry.activate_role(candidate, NodeRole::Submitter)?;

        sched.current_submitter = Some(candidate);
        sched.rotation_at = now + sched.interval_secs;
        sched.rotation_count += 1;
        sched.next_submitter = self.registry.best_submitter_candidate();

        info!(
            previous = ?previous,
            current = %candidate,
            rotation = sched.rotation_count,
            "submitter rotated"
        );
        self.events.publish(OracleEvent::SubmitterRotated {
            previous,
            current: candidate,
            rotation_count: sched.rotation_count,
        });
        Ok(())
    }
}
