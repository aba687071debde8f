//! Hostile-traffic scenarios: replay attacks, rate-limit abuse, and
//! system-wide threat response through the assembled node.

#[cfg(test)]
mod tests {
    use crate::{node_id, TestCluster};
    use fo_security::SecurityError;
    use node_runtime::{OracleConfig, OracleError, SubmissionEvent};
    use shared_types::OracleEvent;

    fn submission(round: u64, voter: u64) -> SubmissionEvent {
        SubmissionEvent::signed(
            round,
            node_id(voter),
            vec![100, 150],
            vec![200, 250],
            vec![0xEF; 64],
        )
    }

    fn hash(n: u8) -> [u8; 32] {
        [n; 32]
    }

    #[test]
    fn test_replay_rejected_no_matter_how_much_time_passes() {
        let cluster = TestCluster::with_default_roster();
        let round = cluster.node.engine().open_round();

        cluster.node.submit(round, submission(round, 1)).unwrap();

        // A week later the same payload is still a replay.
        cluster.clock.advance(7 * 24 * 3_600);
        let err = cluster.node.submit(round, submission(round, 1)).unwrap_err();
        assert!(matches!(
            err,
            OracleError::Security(SecurityError::ReplayDetected { .. })
        ));

        // The same fee vectors in a later round are a distinct payload.
        let next = cluster.node.engine().open_round();
        cluster.node.submit(next, submission(next, 1)).unwrap();
    }

    #[test]
    fn test_replay_raises_alert_and_escalates_threat() {
        let cluster = TestCluster::with_default_roster();
        let round = cluster.node.engine().open_round();

        cluster.node.submit(round, submission(round, 2)).unwrap();
        let _ = cluster.node.submit(round, submission(round, 2));

        assert_eq!(cluster.node.gate().threat_level(), 1);
        let alerts = cluster.node.gate().alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, 4);
        assert_eq!(alerts[0].node, node_id(2));
        assert!(cluster
            .sink
            .events()
            .iter()
            .any(|e| matches!(e, OracleEvent::ThreatDetected { .. })));
    }

    #[test]
    fn test_repeated_replays_auto_blacklist_the_offender() {
        let cluster = TestCluster::with_default_roster();
        let gate = cluster.node.gate();
        let attacker = node_id(3);

        gate.admit(attacker, hash(1), &[0xEF; 64]).unwrap();
        for _ in 0..3 {
            assert!(matches!(
                gate.admit(attacker, hash(1), &[0xEF; 64]),
                Err(SecurityError::ReplayDetected { .. })
            ));
        }

        assert!(gate.is_blacklisted(attacker));
        // Even a fresh payload is now rejected outright.
        assert!(matches!(
            gate.admit(attacker, hash(2), &[0xEF; 64]),
            Err(SecurityError::Blacklisted(_))
        ));
        // Other nodes are unaffected.
        gate.admit(node_id(4), hash(2), &[0xEF; 64]).unwrap();
    }

    #[test]
    fn test_rate_ceiling_locks_out_and_window_recovers() {
        let mut config = OracleConfig::default();
        config.security.rate_limit_max = 3;
        config.security.rate_window_secs = 100;
        config.security.lockout_secs = 50;
        let cluster = TestCluster::new(config);
        let gate = cluster.node.gate();
        let node = node_id(1);

        for n in 0..3 {
            gate.admit(node, hash(n), &[0xEF; 64]).unwrap();
        }
        assert_eq!(
            gate.admit(node, hash(9), &[0xEF; 64]),
            Err(SecurityError::RateLimited { node, retry_at: 50 })
        );

        // Past the lockout and the window reset, submissions flow again.
        cluster.clock.set(150);
        gate.admit(node, hash(9), &[0xEF; 64]).unwrap();
    }

    #[test]
    fn test_threat_pause_blocks_everyone_until_reset() {
        let cluster = TestCluster::with_default_roster();
        let gate = cluster.node.gate();

        gate.set_threat_level(5).unwrap();
        assert!(gate.is_paused());
        for n in 1..=3 {
            assert!(matches!(
                gate.admit(node_id(n), hash(n as u8), &[0xEF; 64]),
                Err(SecurityError::SystemPaused)
            ));
        }

        gate.reset_threat();
        assert!(!gate.is_paused());
        gate.admit(node_id(1), hash(1), &[0xEF; 64]).unwrap();

        let events = cluster.sink.events();
        assert!(events.iter().any(|e| matches!(e, OracleEvent::SystemPaused)));
        assert!(events.iter().any(|e| matches!(e, OracleEvent::SystemResumed)));
    }

    #[test]
    fn test_gate_rejections_erode_registry_reputation() {
        let cluster = TestCluster::with_default_roster();
        let round = cluster.node.engine().open_round();

        cluster.node.submit(round, submission(round, 5)).unwrap();
        for _ in 0..2 {
            let _ = cluster.node.submit(round, submission(round, 5));
        }

        // 75 + 1 activity - 2 x 5 replay penalty.
        assert_eq!(cluster.node.registry().reputation(node_id(5)).unwrap(), 66);
    }
}
