//! Rejection bookkeeping for alignment retries.
//!
//! The driver records every alignment failure here, keyed by sample id and
//! by the failure's textual reason. The tallies live in an explicit context
//! object threaded through the driver (no process-wide state), so a future
//! parallel corpus runner can merge per-shard stats without shared-state
//! hazards.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Rejection tallies accumulated over a corpus run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectionStats {
    /// Rejections per sample id
    by_sample: FxHashMap<String, u32>,
    /// Frequency of each rejection reason
    by_reason: FxHashMap<String, u32>,
    /// Gold node count of each failed sample, recorded at its first failure
    gold_nodes_by_sample: FxHashMap<String, usize>,
}

impl RejectionStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one rejection for a sample.
    ///
    /// The gold node count sticks from the first failure of a given sample
    /// id; later failures only bump the counters.
    pub fn record(&mut self, sample_id: &str, reason: &str, gold_nodes: usize) {
        *self.by_sample.entry(sample_id.to_string()).or_insert(0) += 1;
        *self.by_reason.entry(reason.to_string()).or_insert(0) += 1;
        self.gold_nodes_by_sample
            .entry(sample_id.to_string())
            .or_insert(gold_nodes);
    }

    /// Rejections recorded for a sample id
    pub fn rejections(&self, sample_id: &str) -> u32 {
        self.by_sample.get(sample_id).copied().unwrap_or(0)
    }

    /// Times a given reason was recorded
    pub fn reason_count(&self, reason: &str) -> u32 {
        self.by_reason.get(reason).copied().unwrap_or(0)
    }

    /// Gold node count of a failed sample, if it ever failed
    pub fn gold_nodes(&self, sample_id: &str) -> Option<usize> {
        self.gold_nodes_by_sample.get(sample_id).copied()
    }

    /// Rejection counts keyed by sample id
    pub fn by_sample(&self) -> &FxHashMap<String, u32> {
        &self.by_sample
    }

    /// Rejection-reason frequency table
    pub fn by_reason(&self) -> &FxHashMap<String, u32> {
        &self.by_reason
    }

    /// Gold-node-count table for failed samples
    pub fn gold_nodes_by_sample(&self) -> &FxHashMap<String, usize> {
        &self.gold_nodes_by_sample
    }

    /// Total rejections across all samples
    pub fn total_rejections(&self) -> u64 {
        self.by_sample.values().map(|&c| c as u64).sum()
    }

    /// True when nothing was ever rejected
    pub fn is_empty(&self) -> bool {
        self.by_sample.is_empty()
    }

    /// Fold another stats object into this one (shard merging).
    pub fn merge(&mut self, other: &RejectionStats) {
        for (id, count) in &other.by_sample {
            *self.by_sample.entry(id.clone()).or_insert(0) += count;
        }
        for (reason, count) in &other.by_reason {
            *self.by_reason.entry(reason.clone()).or_insert(0) += count;
        }
        for (id, nodes) in &other.gold_nodes_by_sample {
            self.gold_nodes_by_sample.entry(id.clone()).or_insert(*nodes);
        }
    }
}
