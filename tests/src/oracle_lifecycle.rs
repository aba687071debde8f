//! End-to-end lifecycle scenarios: registration, submission, consensus,
//! and submitter rotation across the assembled node.

#[cfg(test)]
mod tests {
    use crate::{node_id, TestCluster};
    use fo_consensus::ConsensusOutcome;
    use fo_registry::{NodeRole, RegistryError};
    use node_runtime::{OracleConfig, SubmissionEvent};
    use shared_types::OracleEvent;

    fn submission(round: u64, voter: u64, cex: Vec<u64>, dex: Vec<u64>) -> SubmissionEvent {
        SubmissionEvent::signed(round, node_id(voter), cex, dex, vec![0xCD; 64])
    }

    #[test]
    fn test_full_round_from_registration_to_published_aggregate() {
        let cluster = TestCluster::with_default_roster();
        let round = cluster.node.engine().open_round();

        for n in 1..=6 {
            cluster
                .node
                .submit(
                    round,
                    submission(round, n, vec![100, 150, 120], vec![200, 250, 220]),
                )
                .unwrap();
        }

        let outcome = cluster.node.try_consensus(round).unwrap();
        assert!(matches!(
            outcome,
            ConsensusOutcome::Reached {
                participants: 6,
                confidence: 100,
                ..
            }
        ));

        let result = cluster.node.engine().finalize_round(round).unwrap();
        assert_eq!(result.cex_medians, vec![100, 150, 120]);
        assert_eq!(result.dex_medians, vec![200, 250, 220]);
        assert_eq!(cluster.node.engine().latest_result(), Some(result));

        // Every voter earned the activity + participation rewards.
        for n in 1..=6 {
            assert_eq!(cluster.node.registry().reputation(node_id(n)).unwrap(), 78);
        }
        let events = cluster.sink.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, OracleEvent::AggregatePublished { .. })));
    }

    #[test]
    fn test_scheduled_rotation_promotes_highest_reputation_validator() {
        let cluster = TestCluster::with_default_roster();
        // Seeded at t=0 with the default 300 s interval.
        assert_eq!(cluster.node.scheduler().schedule().rotation_at, 300);

        cluster
            .node
            .registry()
            .update_reputation(node_id(3), 90)
            .unwrap();

        cluster.clock.set(200);
        assert_eq!(
            cluster.node.scheduler().rotate(),
            Err(RegistryError::RotationTooEarly { remaining_secs: 100 })
        );

        cluster.clock.set(300);
        assert_eq!(cluster.node.scheduler().rotate().unwrap(), node_id(3));

        let schedule = cluster.node.scheduler().schedule();
        assert_eq!(schedule.current_submitter, Some(node_id(3)));
        assert_eq!(schedule.rotation_at, 600);
        assert_eq!(schedule.rotation_count, 1);
        // The old submitter keeps voting as a validator.
        assert_eq!(
            cluster.node.registry().role(node_id(1)).unwrap(),
            NodeRole::Validator
        );
    }

    #[test]
    fn test_suspending_the_submitter_fails_over_immediately() {
        let cluster = TestCluster::with_default_roster();
        cluster
            .node
            .registry()
            .update_reputation(node_id(4), 85)
            .unwrap();

        cluster
            .node
            .scheduler()
            .suspend(node_id(1), "missed submissions")
            .unwrap();

        assert_eq!(
            cluster.node.registry().role(node_id(1)).unwrap(),
            NodeRole::Suspended
        );
        // Suspension costs 20 reputation.
        assert_eq!(cluster.node.registry().reputation(node_id(1)).unwrap(), 55);
        // The seat moved in the same call, to the best-reputation validator.
        assert_eq!(cluster.node.registry().submitter(), Some(node_id(4)));
        assert_eq!(
            cluster.node.scheduler().schedule().current_submitter,
            Some(node_id(4))
        );
    }

    #[test]
    fn test_backup_promotion_replaces_failed_validator() {
        let cluster = TestCluster::with_default_roster();
        cluster
            .node
            .registry()
            .register(node_id(7), vec![7u8; 33])
            .unwrap();
        cluster
            .node
            .scheduler()
            .activate(node_id(7), NodeRole::Backup)
            .unwrap();

        let promoted = cluster.node.scheduler().activate_backup(node_id(6)).unwrap();

        assert_eq!(promoted, node_id(7));
        assert_eq!(
            cluster.node.registry().role(node_id(7)).unwrap(),
            NodeRole::Validator
        );
        assert_eq!(
            cluster.node.registry().role(node_id(6)).unwrap(),
            NodeRole::Suspended
        );
        // Backup-failover suspension carries the heavier penalty.
        assert_eq!(cluster.node.registry().reputation(node_id(6)).unwrap(), 45);
    }

    #[test]
    fn test_reputation_floor_gates_forced_rotation() {
        let cluster = TestCluster::with_default_roster();

        // Five failed submissions: 75 - 25 = 50, still at the floor.
        for _ in 0..5 {
            cluster
                .node
                .registry()
                .record_failed_submission(node_id(2))
                .unwrap();
        }
        assert_eq!(cluster.node.registry().reputation(node_id(2)).unwrap(), 50);
        cluster.node.scheduler().force_rotate(node_id(2)).unwrap();
        assert_eq!(cluster.node.registry().submitter(), Some(node_id(2)));

        // Six failures: 45, below the floor and no longer promotable.
        for _ in 0..6 {
            cluster
                .node
                .registry()
                .record_failed_submission(node_id(3))
                .unwrap();
        }
        assert_eq!(
            cluster.node.scheduler().force_rotate(node_id(3)),
            Err(RegistryError::BelowMinimumReputation {
                node: node_id(3),
                reputation: 45,
                minimum: 50,
            })
        );
    }

    #[test]
    fn test_deactivation_blocked_at_minimum_active_count() {
        let mut config = OracleConfig::default();
        config.registry.min_active_nodes = 6;
        let cluster = TestCluster::new(config);
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

        assert_eq!(
            cluster.node.scheduler().deactivate(node_id(5)),
            Err(RegistryError::InsufficientActiveNodes {
                active: 6,
                minimum: 6,
            })
        );
        // Still an active validator.
        assert_eq!(
            cluster.node.registry().role(node_id(5)).unwrap(),
            NodeRole::Validator
        );
    }
}
