//! Weighted-median aggregation and outlier detection.

use super::Vote;
use serde::{Deserialize, Serialize};
use shared_types::{FeeBps, NodeId, Timestamp};

/// Weighted median of `(value, weight)` pairs.
///
/// Values are sorted ascending and the result is the first value whose
/// cumulative weight reaches half the total. Deterministic for any input
/// order; integer arithmetic throughout.
pub fn weighted_median(samples: &mut Vec<(FeeBps, u64)>) -> Option<FeeBps> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    let total: u128 = samples.iter().map(|(_, w)| u128::from(*w)).sum();
    let mut cumulative: u128 = 0;
    for (value, weight) in samples.iter() {
        cumulative += u128::from(*weight);
        if cumulative * 2 >= total {
            return Some(*value);
        }
    }
    samples.last().map(|(v, _)| *v)
}

/// Aggregate computed when a round reaches quorum. Held on the round until
/// finalization stamps it into an `AggregationResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundAggregate {
    pub cex_medians: Vec<FeeBps>,
    pub dex_medians: Vec<FeeBps>,
    /// Agreement percentage derived from vote count versus quorum.
    pub confidence: u8,
    pub participants: usize,
    pub outliers: Vec<NodeId>,
}

impl RoundAggregate {
    /// Compute per-index weighted medians across `votes` and flag voters
    /// whose deviation from the median exceeds `outlier_threshold_percent`
    /// at any index.
    pub fn compute(votes: &[Vote], quorum: usize, outlier_threshold_percent: u64) -> Self {
        let cex_medians = per_index_medians(votes, |v| &v.cex_fees);
        let dex_medians = per_index_medians(votes, |v| &v.dex_fees);

        let mut outliers = Vec::new();
        for vote in votes {
            let deviant = exceeds_deviation(&vote.cex_fees, &cex_medians, outlier_threshold_percent)
                || exceeds_deviation(&vote.dex_fees, &dex_medians, outlier_threshold_percent);
            if deviant {
                outliers.push(vote.voter);
            }
        }

        let confidence = ((votes.len() * 100) / quorum.max(1)).min(100) as u8;

        Self {
            cex_medians,
            dex_medians,
            confidence,
            participants: votes.len(),
            outliers,
        }
    }
}

fn per_index_medians(votes: &[Vote], vector: impl Fn(&Vote) -> &Vec<FeeBps>) -> Vec<FeeBps> {
    let width = votes.iter().map(|v| vector(v).len()).max().unwrap_or(0);
    let mut medians = Vec::with_capacity(width);
    for index in 0..width {
        let mut samples: Vec<(FeeBps, u64)> = votes
            .iter()
            .filter_map(|v| vector(v).get(index).map(|value| (*value, v.weight)))
            .collect();
        if let Some(median) = weighted_median(&mut samples) {
            medians.push(median);
        }
    }
    medians
}

/// Whether any per-index value deviates from its median by more than
/// `threshold` percent. A non-zero value against a zero median counts as
/// infinite deviation.
fn exceeds_deviation(values: &[FeeBps], medians: &[FeeBps], threshold: u64) -> bool {
    values.iter().zip(medians.iter()).any(|(value, median)| {
        let diff = value.abs_diff(*median);
        if *median == 0 {
            return diff > 0;
        }
        u128::from(diff) * 100 > u128::from(threshold) * u128::from(*median)
    })
}

/// The immutable outcome of a finalized round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub round: u64,
    pub cex_medians: Vec<FeeBps>,
    pub dex_medians: Vec<FeeBps>,
    /// Overall confidence percentage (0-100).
    pub confidence: u8,
    pub participants: usize,
    pub outliers: Vec<NodeId>,
    pub finalized_at: Timestamp,
}
