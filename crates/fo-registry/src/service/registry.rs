//! Node registry service.

use crate::domain::{Node, NodeRole, RegistryConfig, RegistryError, RegistryResult};
use parking_lot::RwLock;
use shared_types::{EventSink, NodeId, OracleEvent, TimeSource};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-role membership sets.
///
/// A node belongs to exactly one role set at a time; `all_active` mirrors
/// the union of Active, Submitter, and Validator. `BTreeSet` keeps
/// iteration deterministic (ascending by node ID), which fixes the
/// tie-break ambiguity of activation-order iteration.
#[derive(Debug, Default)]
struct RoleSets {
    active: BTreeSet<NodeId>,
    validators: BTreeSet<NodeId>,
    backups: BTreeSet<NodeId>,
    submitter: Option<NodeId>,
    all_active: BTreeSet<NodeId>,
}

impl RoleSets {
    fn remove(&mut self, id: NodeId, role: NodeRole) {
        match role {
            NodeRole::Active => {
                self.active.remove(&id);
            }
            NodeRole::Validator => {
                self.validators.remove(&id);
            }
            NodeRole::Backup => {
                self.backups.remove(&id);
            }
            NodeRole::Submitter => {
                if self.submitter == Some(id) {
                    self.submitter = None;
                }
            }
            NodeRole::Inactive | NodeRole::Suspended => {}
        }
        self.all_active.remove(&id);
    }

    fn insert(&mut self, id: NodeId, role: NodeRole) {
        match role {
            NodeRole::Active => {
                self.active.insert(id);
            }
            NodeRole::Validator => {
                self.validators.insert(id);
            }
            NodeRole::Backup => {
                self.backups.insert(id);
            }
            NodeRole::Submitter => {
                self.submitter = Some(id);
            }
            NodeRole::Inactive | NodeRole::Suspended => {}
        }
        if role.is_active() {
            self.all_active.insert(id);
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    nodes: BTreeMap<NodeId, Node>,
    /// Node IDs in registration order; backup failover scans in this order.
    registration_order: Vec<NodeId>,
    roles: RoleSets,
}

/// Owns node identity, role state, reputation, and performance metrics.
///
/// All state lives behind a single `RwLock`; every operation is a short,
/// synchronous state transition, and readers from other components get
/// cloned snapshots.
pub struct NodeRegistry {
    state: RwLock<RegistryState>,
    config: RegistryConfig,
    time: Arc<dyn TimeSource>,
    events: Arc<dyn EventSink>,
}

impl NodeRegistry {
    pub fn new(
        config: RegistryConfig,
        time: Arc<dyn TimeSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            config,
            time,
            events,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // === LIFECYCLE ===

    /// Register a new node. It enters the Inactive state with the
    /// configured initial reputation.
    pub fn register(&self, id: NodeId, pubkey: Vec<u8>) -> RegistryResult<()> {
        let now = self.time.now();
        let mut state = self.state.write();

        if state.nodes.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        if state.nodes.len() >= self.config.max_nodes {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.config.max_nodes,
            });
        }

        let node = Node::new(id, pubkey, self.config.initial_reputation, now);
        state.nodes.insert(id, node);
        state.registration_order.push(id);
        drop(state);

        info!(node = %id, "node registered");
        self.events.publish(OracleEvent::NodeRegistered {
            node: id,
            registered_at: now,
        });
        Ok(())
    }

    /// Administrator path out of Suspended, back to Inactive.
    pub fn reactivate(&self, id: NodeId) -> RegistryResult<()> {
        let mut state = self.state.write();
        let node = state.nodes.get_mut(&id).ok_or(RegistryError::NodeNotFound(id))?;
        if node.role != NodeRole::Suspended {
            return Err(RegistryError::NotSuspended(id));
        }
        node.role = NodeRole::Inactive;
        drop(state);

        info!(node = %id, "node reactivated");
        self.events.publish(OracleEvent::NodeReactivated { node: id });
        Ok(())
    }

    // === METRIC UPDATES ===

    /// Set a node's reputation outright (clamped to [0, 100]).
    pub fn update_reputation(&self, id: NodeId, reputation: u8) -> RegistryResult<()> {
        self.with_node(id, |node| node.set_reputation(reputation))
    }

    /// Successful activity: +1 reputation, submission bookkeeping.
    pub fn record_activity(&self, id: NodeId) -> RegistryResult<()> {
        let now = self.time.now();
        self.with_node(id, |node| {
            node.reward_reputation(1);
            node.last_active = now;
            node.submission_count += 1;
            node.metrics.successful_submissions += 1;
            node.metrics.recompute_score(node.reputation);
        })
    }

    /// Consensus participation: +2 reputation.
    pub fn record_consensus_participation(&self, id: NodeId) -> RegistryResult<()> {
        self.with_node(id, |node| {
            node.reward_reputation(2);
            node.consensus_participations += 1;
        })
    }

    /// Failed submission: -5 reputation.
    pub fn record_failed_submission(&self, id: NodeId) -> RegistryResult<()> {
        self.with_node(id, |node| {
            node.penalize_reputation(5);
            node.metrics.failed_submissions += 1;
            node.metrics.recompute_score(node.reputation);
        })
    }

    /// Fold a response-time sample into the node's moving average.
    pub fn record_response_time(&self, id: NodeId, sample_ms: u64) -> RegistryResult<()> {
        self.with_node(id, |node| {
            node.metrics.record_response_time(sample_ms);
            node.metrics.recompute_score(node.reputation);
        })
    }

    /// Record a downtime period and recompute uptime.
    pub fn record_downtime(&self, id: NodeId, downtime_secs: u64) -> RegistryResult<()> {
        let now = self.time.now();
        self.with_node(id, |node| node.record_downtime(downtime_secs, now))
    }

    // === QUERIES ===

    /// Snapshot of a node record.
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.state.read().nodes.get(&id).cloned()
    }

    pub fn reputation(&self, id: NodeId) -> RegistryResult<u8> {
        self.state
            .read()
            .nodes
            .get(&id)
            .map(|n| n.reputation)
            .ok_or(RegistryError::NodeNotFound(id))
    }

    pub fn role(&self, id: NodeId) -> RegistryResult<NodeRole> {
        self.state
            .read()
            .nodes
            .get(&id)
            .map(|n| n.role)
            .ok_or(RegistryError::NodeNotFound(id))
    }

    pub fn registered_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn active_count(&self) -> usize {
        self.state.read().roles.all_active.len()
    }

    pub fn validators(&self) -> Vec<NodeId> {
        self.state.read().roles.validators.iter().copied().collect()
    }

    pub fn backups(&self) -> Vec<NodeId> {
        self.state.read().roles.backups.iter().copied().collect()
    }

    pub fn submitter(&self) -> Option<NodeId> {
        self.state.read().roles.submitter
    }

    /// Whether a node may vote in a consensus round.
    pub fn is_eligible_voter(&self, id: NodeId) -> bool {
        matches!(
            self.state.read().nodes.get(&id).map(|n| n.role),
            Some(NodeRole::Submitter) | Some(NodeRole::Validator)
        )
    }

    /// Vote weight derived from reputation: monotonic, and non-zero for
    /// any registered eligible voter.
    pub fn vote_weight(&self, id: NodeId) -> Option<u64> {
        let state = self.state.read();
        let node = state.nodes.get(&id)?;
        match node.role {
            NodeRole::Submitter | NodeRole::Validator => {
                Some(u64::from(node.reputation).max(1))
            }
            _ => None,
        }
    }

    // === ROLE PRIMITIVES (used by the rotation scheduler) ===

    /// Validate and apply an activation into a target role.
    pub(crate) fn activate_role(&self, id: NodeId, target: NodeRole) -> RegistryResult<()> {
        if !matches!(
            target,
            NodeRole::Active | NodeRole::Submitter | NodeRole::Validator | NodeRole::Backup
        ) {
            let from = self.role(id)?;
            return Err(RegistryError::InvalidRoleTransition { node: id, from, to: target });
        }

        let mut state = self.state.write();
        let from = state
            .nodes
            .get(&id)
            .map(|n| n.role)
            .ok_or(RegistryError::NodeNotFound(id))?;

        // Suspended nodes come back only through reactivate().
        if from == NodeRole::Suspended {
            return Err(RegistryError::InvalidRoleTransition { node: id, from, to: target });
        }
        // The submitter seat is single-occupancy; it changes hands only
        // through rotation.
        if target == NodeRole::Submitter
            && state.roles.submitter.is_some()
            && state.roles.submitter != Some(id)
        {
            return Err(RegistryError::InvalidRoleTransition { node: id, from, to: target });
        }

        if let Some(node) = state.nodes.get_mut(&id) {
            node.role = target;
            if target == NodeRole::Backup {
                node.is_backup = true;
            }
        }
        state.roles.remove(id, from);
        state.roles.insert(id, target);
        drop(state);

        debug!(node = %id, ?from, to = ?target, "role transition");
        self.events.publish(OracleEvent::NodeActivated {
            node: id,
            role: format!("{target:?}"),
        });
        Ok(())
    }

    /// Move a node to Inactive, enforcing the minimum active count.
    /// Returns whether the node held the submitter seat.
    pub(crate) fn deactivate_node(&self, id: NodeId) -> RegistryResult<bool> {
        let mut state = self.state.write();
        let node = state.nodes.get(&id).ok_or(RegistryError::NodeNotFound(id))?;
        let from = node.role;

        if from.is_active() && state.roles.all_active.len() <= self.config.min_active_nodes {
            return Err(RegistryError::InsufficientActiveNodes {
                active: state.roles.all_active.len(),
                minimum: self.config.min_active_nodes,
            });
        }

        let was_submitter = from == NodeRole::Submitter;
        let node = state.nodes.get_mut(&id).expect("checked above");
        node.role = NodeRole::Inactive;
        state.roles.remove(id, from);
        drop(state);

        info!(node = %id, was_submitter, "node deactivated");
        self.events.publish(OracleEvent::NodeDeactivated { node: id });
        Ok(was_submitter)
    }

    /// Force a node into Suspended with a reputation penalty.
    /// Returns whether the node held the submitter seat.
    pub(crate) fn suspend_node(
        &self,
        id: NodeId,
        reason: &str,
        penalty: u8,
    ) -> RegistryResult<bool> {
        let mut state = self.state.write();
        let node = state.nodes.get_mut(&id).ok_or(RegistryError::NodeNotFound(id))?;
        let from = node.role;
        let was_submitter = from == NodeRole::Submitter;

        node.role = NodeRole::Suspended;
        node.penalize_reputation(penalty);
        state.roles.remove(id, from);
        drop(state);

        warn!(node = %id, reason, penalty, "node suspended");
        self.events.publish(OracleEvent::NodeSuspended {
            node: id,
            reason: reason.to_string(),
        });
        Ok(was_submitter)
    }

    /// Promote the first eligible backup (registration order, reputation at
    /// or above the minimum) to Validator and suspend the failed node.
    /// Returns `(backup, failed_was_submitter)`.
    pub(crate) fn promote_backup(&self, failed: NodeId) -> RegistryResult<(NodeId, bool)> {
        let backup = {
            let state = self.state.read();
            if !state.nodes.contains_key(&failed) {
                return Err(RegistryError::NodeNotFound(failed));
            }
            state
                .registration_order
                .iter()
                .copied()
                .find(|id| {
                    state.nodes.get(id).is_some_and(|n| {
                        n.role == NodeRole::Backup
                            && n.reputation >= self.config.min_eligible_reputation
                    })
                })
                .ok_or(RegistryError::NoEligibleBackups)?
        };

        let failed_was_submitter = self.suspend_node(failed, "backup failover", 30)?;
        self.activate_role(backup, NodeRole::Validator)?;

        info!(backup = %backup, failed = %failed, "backup promoted to validator");
        self.events.publish(OracleEvent::BackupActivated { backup, failed });
        Ok((backup, failed_was_submitter))
    }

    /// Best submitter candidate: the Validator with the strictly highest
    /// reputation at or above the eligibility floor. Validators iterate in
    /// ascending ID order, so ties go to the lowest ID.
    pub(crate) fn best_submitter_candidate(&self) -> Option<NodeId> {
        let state = self.state.read();
        let mut best: Option<(NodeId, u8)> = None;
        for id in &state.roles.validators {
            let Some(node) = state.nodes.get(id) else {
                continue;
            };
            if node.reputation < self.config.min_eligible_reputation {
                continue;
            }
            match best {
                Some((_, rep)) if node.reputation <= rep => {}
                _ => best = Some((*id, node.reputation)),
            }
        }
        best.map(|(id, _)| id)
    }

    // === HELPERS ===

    fn with_node(&self, id: NodeId, f: impl FnOnce(&mut Node)) -> RegistryResult<()> {
        let mut state = self.state.write();
        let node = state.nodes.get_mut(&id).ok_or(RegistryError::NodeNotFound(id))?;
        f(node);
        Ok(())
    }
}
