//! Edge-level scoring across the corpus.
//!
//! Every completed (non-abandoned) sample contributes its decoded edge
//! count (tries), the subset of those that survived translation into gold
//! space (hits), and its gold edge count. The three running totals derive
//! precision, recall, and F-score at the end of the run.

use crate::errors::{OracleError, Result};
use serde::{Deserialize, Serialize};

/// Running hit/try/gold totals.
///
/// `hits` is defined as `tries − missing`, so `hits ≤ tries` holds by
/// construction; `hits ≤ gold` holds because every hit is a translated
/// decoded edge that matched a distinct gold edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAggregator {
    tries: u64,
    hits: u64,
    gold: u64,
}

/// Final corpus metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub fscore: f64,
}

impl ScoreAggregator {
    /// Create a zeroed aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one completed sample: its decoded edge count, how many gold
    /// edges its translation missed, and its gold edge count.
    pub fn observe(&mut self, tries: usize, missing: usize, gold: usize) {
        self.tries += tries as u64;
        self.hits += tries.saturating_sub(missing) as u64;
        self.gold += gold as u64;
    }

    /// Total decoded edges across completed samples
    pub fn tries(&self) -> u64 {
        self.tries
    }

    /// Total decoded edges that matched a gold edge
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Total gold edges across completed samples
    pub fn gold(&self) -> u64 {
        self.gold
    }

    /// Fold another aggregator into this one (shard merging).
    pub fn merge(&mut self, other: &ScoreAggregator) {
        self.tries += other.tries;
        self.hits += other.hits;
        self.gold += other.gold;
    }

    /// Derive precision / recall / F-score.
    ///
    /// Fails with [`OracleError::DegenerateMetric`] when either divisor is
    /// zero — the caller decides whether that is reportable or fatal; a
    /// silent default is never emitted. When precision and recall are both
    /// zero the F-score is reported as `0.0` (the 0/0 limit), never NaN.
    pub fn metrics(&self) -> Result<Scores> {
        if self.tries == 0 || self.gold == 0 {
            return Err(OracleError::DegenerateMetric {
                tries: self.tries,
                gold: self.gold,
            });
        }

        let precision = self.hits as f64 / self.tries as f64;
        let recall = self.hits as f64 / self.gold as f64;
        let fscore = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(Scores {
            precision,
            recall,
            fscore,
        })
    }
}
