//! Consensus engine service.


use crate::domain::{
    AggregationResult, ConsensusConfig, ConsensusError, ConsensusResult, Round, RoundAggregate,
    RoundState, Vote,
};
use crate::ports::{ConsensusParticipant, VoterDirectory};
use dashmap::DashMap;
use parking_lot::RwLock;
use shared_types::{EventSink, FeeBps, NodeId, OracleEvent, TimeSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a consensus attempt. Falling short of quorum is a reported
/// outcome, not an error: the round stays open for more votes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsensusOutcome {
    Reached {
        round: u64,
        participants: usize,
        confidence: u8,
    },
    Failed {
        round: u64,
        votes: usize,
        required: usize,
    },
}

/// Owns round lifecycle, vote collection, quorum checks, and aggregation.
///
/// Rounds live in a sharded map: all vote casting and state transitions
/// for one round are serialized on its entry, while distinct rounds
/// proceed fully in parallel.
pub struct ConsensusEngine {
    rounds: DashMap<u64, Round>,
    round_seq: AtomicU64,
    latest_result: RwLock<Option<AggregationResult>>,
    voters: Arc<dyn VoterDirectory>,
    participants: Arc<dyn ConsensusParticipant>,
    config: ConsensusConfig,
    time: Arc<dyn TimeSource>,
    events: Arc<dyn EventSink>,
}

impl ConsensusEngine {
    pub fn new(
        config: ConsensusConfig,
        voters: Arc<dyn VoterDirectory>,
        participants: Arc<dyn ConsensusParticipant>,
        time: Arc<dyn TimeSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            rounds: DashMap::new(),
            round_seq: AtomicU64::new(1),
            latest_result: RwLock::new(None),
            voters,
            participants,
            config,
            time,
            events,
        }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    // === ROUND LIFECYCLE ===

    /// Open a new round with the next monotonic ID.
    pub fn open_round(&self) -> u64 {
        let id = self.round_seq.fetch_add(1, Ordering::SeqCst);
        let now = self.time.now();
        self.rounds.insert(id, Round::new(id, now));
        debug!(round = id, "round opened");
        id
    }

    /// Record a vote for an open round.
    pub fn cast_vote(
        &self,
        round_id: u64,
        voter: NodeId,
        cex_fees: Vec<FeeBps>,
        dex_fees: Vec<FeeBps>,
    ) -> ConsensusResult<()> {
        if cex_fees.is_empty() {
            return Err(ConsensusError::InvalidSubmissionData("empty CEX fee vector"));
        }
        if dex_fees.is_empty() {
            return Err(ConsensusError::InvalidSubmissionData("empty DEX fee vector"));
        }
        let weight = self
            .voters
            .vote_weight(voter)
            .ok_or(ConsensusError::UnauthorizedVoter(voter))?;

        let now = self.time.now();
        let mut round = self
            .rounds
            .get_mut(&round_id)
            .ok_or(ConsensusError::RoundNotFound(round_id))?;

        match round.state {
            RoundState::Open => {}
            RoundState::Finalized => return Err(ConsensusError::AlreadyFinalized(round_id)),
            RoundState::ThresholdReached => return Err(ConsensusError::RoundClosed(round_id)),
        }
        if round.has_voted(voter) {
            return Err(ConsensusError::DuplicateVote(voter));
        }

        round.votes.push(Vote {
            voter,
            cex_fees,
            dex_fees,
            weight,
            cast_at: now,
        });
        let count = round.vote_count();
        drop(round);

        debug!(round = round_id, voter = %voter, weight, votes = count, "vote cast");
        self.events.publish(OracleEvent::VoteCast {
            round: round_id,
            voter,
            weight,
        });
        Ok(())
    }

    /// Check quorum and, if reached, aggregate the round.
    ///
    /// Serialized per round: of two concurrent calls, one computes the
    /// aggregate and the other observes the already-reached state and
    /// returns the same outcome without recomputing.
    pub fn process_consensus(&self, round_id: u64) -> ConsensusResult<ConsensusOutcome> {
        let mut round = self
            .rounds
            .get_mut(&round_id)
            .ok_or(ConsensusError::RoundNotFound(round_id))?;

        match round.state {
            RoundState::Finalized => return Err(ConsensusError::AlreadyFinalized(round_id)),
            RoundState::ThresholdReached => {
                let agg = round.pending.as_ref().expect("threshold round has aggregate");
                return Ok(ConsensusOutcome::Reached {
                    round: round_id,
                    participants: agg.participants,
                    confidence: agg.confidence,
                });
            }
            RoundState::Open => {}
        }

        let votes = round.vote_count();
        let required = self.config.quorum;
        if votes < required {
            drop(round);
            info!(round = round_id, votes, required, "consensus failed, below quorum");
            self.events.publish(OracleEvent::ConsensusFailed {
                round: round_id,
                votes,
                required,
            });
            return Ok(ConsensusOutcome::Failed {
                round: round_id,
                votes,
                required,
            });
        }

        let aggregate =
            RoundAggregate::compute(&round.votes, required, self.config.outlier_threshold_percent);
        let participants = aggregate.participants;
        let confidence = aggregate.confidence;
        if !aggregate.outliers.is_empty() {
            warn!(round = round_id, outliers = aggregate.outliers.len(), "outlier votes flagged");
        }
        round.state = RoundState::ThresholdReached;
        round.consensus_reached = true;
        round.pending = Some(aggregate);
        drop(round);

        info!(round = round_id, participants, confidence, "consensus reached");
        self.events.publish(OracleEvent::ConsensusReached {
            round: round_id,
            participants,
            confidence,
        });
        Ok(ConsensusOutcome::Reached {
            round: round_id,
            participants,
            confidence,
        })
    }

    /// Package a threshold-reached round into an immutable result and
    /// report participation outcomes to the registry.
    pub fn finalize_round(&self, round_id: u64) -> ConsensusResult<AggregationResult> {
        let now = self.time.now();
        let mut round = self
            .rounds
            .get_mut(&round_id)
            .ok_or(ConsensusError::RoundNotFound(round_id))?;

        match round.state {
            RoundState::Finalized => return Err(ConsensusError::AlreadyFinalized(round_id)),
            RoundState::Open => {
                return Err(ConsensusError::ConsensusNotReached {
                    round: round_id,
                    votes: round.vote_count(),
                    required: self.config.quorum,
                });
            }
            RoundState::ThresholdReached => {}
        }

        let aggregate = round.pending.take().expect("threshold round has aggregate");
        let result = AggregationResult {
            round: round_id,
            cex_medians: aggregate.cex_medians,
            dex_medians: aggregate.dex_medians,
            confidence: aggregate.confidence,
            participants: aggregate.participants,
            outliers: aggregate.outliers,
            finalized_at: now,
        };
        round.state = RoundState::Finalized;
        round.result = Some(result.clone());
        let voters: Vec<NodeId> = round.votes.iter().map(|v| v.voter).collect();
        drop(round);

        for voter in voters {
            if result.outliers.contains(&voter) {
                self.participants.record_outlier(voter);
            } else {
                self.participants.record_participation(voter);
            }
        }

        *self.latest_result.write() = Some(result.clone());
        info!(round = round_id, confidence = result.confidence, "round finalized");
        self.events.publish(OracleEvent::RoundFinalized {
            round: round_id,
            finalized_at: now,
        });
        self.events.publish(OracleEvent::AggregatePublished {
            round: round_id,
            cex_fees: result.cex_medians.clone(),
            dex_fees: result.dex_medians.clone(),
        });
        Ok(result)
    }

    /// Administrative recovery: clear all votes and reopen the round.
    /// Finalized rounds are immutable and cannot be reset.
    pub fn reset_round(&self, round_id: u64) -> ConsensusResult<()> {
        let now = self.time.now();
        let mut round = self
            .rounds
            .get_mut(&round_id)
            .ok_or(ConsensusError::RoundNotFound(round_id))?;
        if round.state == RoundState::Finalized {
            return Err(ConsensusError::AlreadyFinalized(round_id));
        }
        round.reset(now);
        drop(round);

        warn!(round = round_id, "round reset");
        self.events.publish(OracleEvent::RoundReset { round: round_id });
        Ok(())
    }

    // === QUERIES ===

    pub fn round_state(&self, round_id: u64) -> Option<RoundState> {
        self.rounds.get(&round_id).map(|r| r.state)
    }

    /// Snapshot of a round's vote set, in insertion order.
    pub fn votes(&self, round_id: u64) -> Option<Vec<Vote>> {
        self.rounds.get(&round_id).map(|r| r.votes.clone())
    }

    pub fn vote_count(&self, round_id: u64) -> Option<usize> {
        self.rounds.get(&round_id).map(|r| r.vote_count())
    }

    /// Stored result of a finalized round.
    pub fn result(&self, round_id: u64) -> Option<AggregationResult> {
        self.rounds.get(&round_id).and_then(|r| r.result.clone())
    }

    /// The most recently finalized aggregation result.
    pub fn latest_result(&self) -> Option<AggregationResult> {
        self.latest_result.read().clone()
    }
}
