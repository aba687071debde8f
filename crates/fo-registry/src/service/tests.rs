//! Registry and rotation scheduler tests.

use crate::domain::{NodeRole, RegistryConfig, RegistryError};
use crate::service::{NodeRegistry, RotationScheduler};
use shared_types::{InMemoryEventSink, ManualTimeSource, NodeId, OracleEvent};
use std::sync::Arc;

struct Fixture {
    scheduler: RotationScheduler,
    registry: Arc<NodeRegistry>,
    clock: Arc<ManualTimeSource>,
    sink: Arc<InMemoryEventSink>,
}

fn fixture() -> Fixture {
    fixture_with(RegistryConfig::default())
}

fn fixture_with(config: RegistryConfig) -> Fixture {
    let clock = Arc::new(ManualTimeSource::new(0));
    let sink = Arc::new(InMemoryEventSink::new());
    let registry = Arc::new(NodeRegistry::new(
        config.clone(),
        clock.clone(),
        sink.clone(),
    ));
    let scheduler = RotationScheduler::new(registry.clone(), config, clock.clone(), sink.clone());
    Fixture {
        scheduler,
        registry,
        clock,
        sink,
    }
}

fn id(n: u64) -> NodeId {
    NodeId::from_low_u64(n)
}

/// Register `count` nodes with IDs 1..=count.
fn register_nodes(f: &Fixture, count: u64) {
    for n in 1..=count {
        f.registry.register(id(n), vec![]).unwrap();
    }
}

// =============================================================================
// REGISTRATION
// =============================================================================

#[test]
fn test_register_starts_inactive_at_75() {
    let f = fixture();
    f.registry.register(id(1), vec![1, 2, 3]).unwrap();

    let node = f.registry.node(id(1)).unwrap();
    assert_eq!(node.role, NodeRole::Inactive);
    assert_eq!(node.reputation, 75);
    assert_eq!(node.pubkey, vec![1, 2, 3]);
}

#[test]
fn test_register_duplicate_rejected() {
    let f = fixture();
    f.registry.register(id(1), vec![]).unwrap();

    assert_eq!(
        f.registry.register(id(1), vec![]),
        Err(RegistryError::AlreadyRegistered(id(1)))
    );
}

#[test]
fn test_register_capacity_exceeded() {
    let f = fixture();
    register_nodes(&f, 10);

    assert_eq!(
        f.registry.register(id(11), vec![]),
        Err(RegistryError::CapacityExceeded { capacity: 10 })
    );
}

#[test]
fn test_empty_pubkey_permitted() {
    let f = fixture();
    assert!(f.registry.register(id(1), vec![]).is_ok());
}

// =============================================================================
// ROLE STATE MACHINE
// =============================================================================

#[test]
fn test_activation_moves_between_role_sets() {
    let f = fixture();
    register_nodes(&f, 2);

    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();
    f.scheduler.activate(id(2), NodeRole::Backup).unwrap();

    assert_eq!(f.registry.validators(), vec![id(1)]);
    assert_eq!(f.registry.backups(), vec![id(2)]);
    assert_eq!(f.registry.active_count(), 1); // backups are not active

    // Re-activating into a different role removes prior membership.
    f.scheduler.activate(id(1), NodeRole::Active).unwrap();
    assert!(f.registry.validators().is_empty());
    assert_eq!(f.registry.active_count(), 1);
}

#[test]
fn test_first_submitter_seeds_schedule() {
    let f = fixture();
    register_nodes(&f, 1);

    f.scheduler.activate(id(1), NodeRole::Submitter).unwrap();

    let sched = f.scheduler.schedule();
    assert_eq!(sched.current_submitter, Some(id(1)));
    assert_eq!(sched.rotation_at, 300);
    assert_eq!(f.registry.submitter(), Some(id(1)));
}

#[test]
fn test_second_submitter_activation_rejected() {
    let f = fixture();
    register_nodes(&f, 2);
    f.scheduler.activate(id(1), NodeRole::Submitter).unwrap();

    assert!(matches!(
        f.scheduler.activate(id(2), NodeRole::Submitter),
        Err(RegistryError::InvalidRoleTransition { .. })
    ));
}

#[test]
fn test_suspended_requires_reactivate() {
    let f = fixture();
    register_nodes(&f, 2);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();
    f.scheduler.activate(id(2), NodeRole::Validator).unwrap();
    f.scheduler.suspend(id(1), "misbehavior").unwrap();

    assert!(matches!(
        f.scheduler.activate(id(1), NodeRole::Validator),
        Err(RegistryError::InvalidRoleTransition { .. })
    ));

    f.registry.reactivate(id(1)).unwrap();
    assert_eq!(f.registry.role(id(1)).unwrap(), NodeRole::Inactive);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();
}

#[test]
fn test_reactivate_requires_suspended() {
    let f = fixture();
    register_nodes(&f, 1);

    assert_eq!(
        f.registry.reactivate(id(1)),
        Err(RegistryError::NotSuspended(id(1)))
    );
}

#[test]
fn test_suspend_applies_minus_20_floored() {
    let f = fixture();
    register_nodes(&f, 2);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();
    f.scheduler.activate(id(2), NodeRole::Validator).unwrap();

    f.registry.update_reputation(id(1), 10).unwrap();
    f.scheduler.suspend(id(1), "flaky").unwrap();

    let node = f.registry.node(id(1)).unwrap();
    assert_eq!(node.role, NodeRole::Suspended);
    assert_eq!(node.reputation, 0); // floored, not underflowed
}

#[test]
fn test_deactivate_enforces_minimum_active() {
    let f = fixture();
    register_nodes(&f, 1);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();

    assert_eq!(
        f.scheduler.deactivate(id(1)),
        Err(RegistryError::InsufficientActiveNodes {
            active: 1,
            minimum: 1
        })
    );
}

// =============================================================================
// METRICS & REPUTATION
// =============================================================================

#[test]
fn test_activity_and_participation_capped_at_100() {
    let f = fixture();
    register_nodes(&f, 1);

    for _ in 0..30 {
        f.registry.record_activity(id(1)).unwrap();
        f.registry.record_consensus_participation(id(1)).unwrap();
    }

    let node = f.registry.node(id(1)).unwrap();
    assert_eq!(node.reputation, 100);
    assert_eq!(node.submission_count, 30);
    assert_eq!(node.consensus_participations, 30);
}

#[test]
fn test_five_failures_hit_eligibility_floor_sixth_drops_below() {
    let f = fixture();
    register_nodes(&f, 1);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();

    for _ in 0..5 {
        f.registry.record_failed_submission(id(1)).unwrap();
    }
    assert_eq!(f.registry.reputation(id(1)).unwrap(), 50);
    assert_eq!(f.registry.best_submitter_candidate(), Some(id(1)));

    f.registry.record_failed_submission(id(1)).unwrap();
    assert_eq!(f.registry.reputation(id(1)).unwrap(), 45);
    assert_eq!(f.registry.best_submitter_candidate(), None);
}

#[test]
fn test_reputation_always_in_bounds_under_mixed_updates() {
    let f = fixture();
    register_nodes(&f, 1);

    for i in 0..200u32 {
        if i % 3 == 0 {
            f.registry.record_failed_submission(id(1)).unwrap();
        } else {
            f.registry.record_activity(id(1)).unwrap();
        }
        let node = f.registry.node(id(1)).unwrap();
        assert!(node.reputation <= 100);
        assert!(node.metrics.score <= 100);
    }
}

#[test]
fn test_response_time_feeds_score() {
    let f = fixture();
    register_nodes(&f, 1);

    f.registry.record_response_time(id(1), 500).unwrap();
    let fast = f.registry.node(id(1)).unwrap().metrics.score;

    f.registry.record_response_time(id(1), 60_000).unwrap();
    f.registry.record_response_time(id(1), 60_000).unwrap();
    f.registry.record_response_time(id(1), 60_000).unwrap();
    let slow = f.registry.node(id(1)).unwrap().metrics.score;

    assert!(slow < fast);
}

#[test]
fn test_downtime_lowers_uptime() {
    let f = fixture();
    register_nodes(&f, 1);
    f.clock.set(1_000);

    f.registry.record_downtime(id(1), 250).unwrap();
    let node = f.registry.node(id(1)).unwrap();
    assert_eq!(node.metrics.uptime_percent, 75);
    assert_eq!(node.metrics.last_downtime_secs, 250);
}

#[test]
fn test_vote_weight_requires_voting_role() {
    let f = fixture();
    register_nodes(&f, 2);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();

    assert_eq!(f.registry.vote_weight(id(1)), Some(75));
    assert_eq!(f.registry.vote_weight(id(2)), None); // inactive

    // Zero reputation still yields non-zero weight once eligible.
    f.registry.update_reputation(id(1), 0).unwrap();
    assert_eq!(f.registry.vote_weight(id(1)), Some(1));
}

// =============================================================================
// ROTATION
// =============================================================================

/// Standard rotation fixture: submitter A (id 1) plus validators.
fn rotation_fixture(validators: &[(u64, u8)]) -> Fixture {
    let f = fixture();
    f.registry.register(id(1), vec![]).unwrap();
    f.scheduler.activate(id(1), NodeRole::Submitter).unwrap();
    for (n, rep) in validators {
        f.registry.register(id(*n), vec![]).unwrap();
        f.scheduler.activate(id(*n), NodeRole::Validator).unwrap();
        f.registry.update_reputation(id(*n), *rep).unwrap();
    }
    f
}

#[test]
fn test_rotate_too_early_then_succeeds() {
    let f = rotation_fixture(&[(2, 80), (3, 60)]);

    f.clock.set(200);
    assert_eq!(
        f.scheduler.rotate(),
        Err(RegistryError::RotationTooEarly { remaining_secs: 100 })
    );

    f.clock.set(301);
    let new = f.scheduler.rotate().unwrap();
    assert_eq!(new, id(2)); // highest reputation validator
    assert_eq!(f.registry.role(id(1)).unwrap(), NodeRole::Validator);
    assert_eq!(f.registry.role(id(2)).unwrap(), NodeRole::Submitter);

    let sched = f.scheduler.schedule();
    assert_eq!(sched.current_submitter, Some(id(2)));
    assert_eq!(sched.rotation_at, 301 + 300);
    assert_eq!(sched.rotation_count, 1);
}

#[test]
fn test_rotate_ignores_below_minimum_reputation() {
    let f = rotation_fixture(&[(2, 49), (3, 55)]);

    f.clock.set(300);
    assert_eq!(f.scheduler.rotate().unwrap(), id(3));
}

#[test]
fn test_rotate_tie_breaks_to_lowest_id() {
    let f = rotation_fixture(&[(4, 70), (2, 70), (3, 70)]);

    f.clock.set(300);
    assert_eq!(f.scheduler.rotate().unwrap(), id(2));
}

#[test]
fn test_rotate_no_eligible_submitters() {
    let f = rotation_fixture(&[(2, 30)]);

    f.clock.set(300);
    assert_eq!(f.scheduler.rotate(), Err(RegistryError::NoEligibleSubmitters));

    // Recoverable: raise the validator's reputation and retry.
    f.registry.update_reputation(id(2), 60).unwrap();
    assert_eq!(f.scheduler.rotate().unwrap(), id(2));
}

#[test]
fn test_rotation_precomputes_lookahead() {
    let f = rotation_fixture(&[(2, 80), (3, 60)]);

    f.clock.set(300);
    f.scheduler.rotate().unwrap();

    // After promoting 2, old submitter 1 (rep 75) is the best validator.
    assert_eq!(f.scheduler.schedule().next_submitter, Some(id(1)));
}

#[test]
fn test_suspending_submitter_rotates_away() {
    let f = rotation_fixture(&[(2, 80)]);

    f.scheduler.suspend(id(1), "unresponsive").unwrap();

    let sched = f.scheduler.schedule();
    assert_eq!(sched.current_submitter, Some(id(2)));
    assert_eq!(f.registry.role(id(1)).unwrap(), NodeRole::Suspended);
    assert_eq!(f.registry.role(id(2)).unwrap(), NodeRole::Submitter);
}

#[test]
fn test_losing_submitter_with_no_successor_empties_seat() {
    let f = rotation_fixture(&[(2, 20)]);

    f.scheduler.suspend(id(1), "unresponsive").unwrap();

    let sched = f.scheduler.schedule();
    assert_eq!(sched.current_submitter, None);
    // The schedule never points at the suspended node.
    assert_ne!(sched.current_submitter, Some(id(1)));
}

#[test]
fn test_deactivating_submitter_rotates_away() {
    let f = rotation_fixture(&[(2, 80), (3, 60)]);

    f.scheduler.deactivate(id(1)).unwrap();

    assert_eq!(f.scheduler.schedule().current_submitter, Some(id(2)));
    assert_eq!(f.registry.role(id(1)).unwrap(), NodeRole::Inactive);
}

#[test]
fn test_force_rotate_requires_minimum_reputation() {
    let f = rotation_fixture(&[(2, 30)]);

    assert_eq!(
        f.scheduler.force_rotate(id(2)),
        Err(RegistryError::BelowMinimumReputation {
            node: id(2),
            reputation: 30,
            minimum: 50
        })
    );

    f.registry.update_reputation(id(2), 50).unwrap();
    f.scheduler.force_rotate(id(2)).unwrap();
    assert_eq!(f.scheduler.schedule().current_submitter, Some(id(2)));
    assert_eq!(f.registry.role(id(1)).unwrap(), NodeRole::Validator);
}

#[test]
fn test_set_interval_bounds() {
    let f = fixture();
    assert!(f.scheduler.set_interval(59).is_err());
    assert!(f.scheduler.set_interval(3_601).is_err());
    assert!(f.scheduler.set_interval(60).is_ok());
    assert_eq!(f.scheduler.schedule().interval_secs, 60);
}

#[test]
fn test_rotation_emits_event() {
    let f = rotation_fixture(&[(2, 80)]);

    f.clock.set(300);
    f.scheduler.rotate().unwrap();

    assert!(f.sink.events().iter().any(|e| matches!(
        e,
        OracleEvent::SubmitterRotated {
            previous: Some(p),
            current,
            rotation_count: 1,
        } if *p == id(1) && *current == id(2)
    )));
}

// =============================================================================
// BACKUP FAILOVER
// =============================================================================

#[test]
fn test_backup_promoted_in_registration_order() {
    let f = fixture();
    register_nodes(&f, 4);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();
    f.scheduler.activate(id(2), NodeRole::Validator).unwrap();
    f.scheduler.activate(id(3), NodeRole::Backup).unwrap();
    f.scheduler.activate(id(4), NodeRole::Backup).unwrap();

    let backup = f.scheduler.activate_backup(id(1)).unwrap();
    assert_eq!(backup, id(3)); // first registered eligible backup

    assert_eq!(f.registry.role(id(3)).unwrap(), NodeRole::Validator);
    assert_eq!(f.registry.role(id(1)).unwrap(), NodeRole::Suspended);
    // Failed node takes the larger penalty: 75 - 30.
    assert_eq!(f.registry.reputation(id(1)).unwrap(), 45);
    assert!(f.registry.node(id(3)).unwrap().is_backup);
}

#[test]
fn test_backup_scan_skips_low_reputation() {
    let f = fixture();
    register_nodes(&f, 3);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();
    f.scheduler.activate(id(2), NodeRole::Backup).unwrap();
    f.scheduler.activate(id(3), NodeRole::Backup).unwrap();
    f.registry.update_reputation(id(2), 40).unwrap();

    assert_eq!(f.scheduler.activate_backup(id(1)).unwrap(), id(3));
}

#[test]
fn test_backup_failover_without_candidates_fails() {
    let f = fixture();
    register_nodes(&f, 2);
    f.scheduler.activate(id(1), NodeRole::Validator).unwrap();
    f.scheduler.activate(id(2), NodeRole::Validator).unwrap();

    assert_eq!(
        f.scheduler.activate_backup(id(1)),
        Err(RegistryError::NoEligibleBackups)
    );
    // Failed node untouched when no backup qualifies.
    assert_eq!(f.registry.role(id(1)).unwrap(), NodeRole::Validator);
}

#[test]
fn test_backup_failover_replaces_failed_submitter() {
    let f = fixture();
    register_nodes(&f, 3);
    f.scheduler.activate(id(1), NodeRole::Submitter).unwrap();
    f.scheduler.activate(id(2), NodeRole::Validator).unwrap();
    f.scheduler.activate(id(3), NodeRole::Backup).unwrap();

    f.scheduler.activate_backup(id(1)).unwrap();

    let sched = f.scheduler.schedule();
    assert_ne!(sched.current_submitter, Some(id(1)));
    assert!(sched.current_submitter.is_some());
}
