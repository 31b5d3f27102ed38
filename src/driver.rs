//! The per-sample alignment driver and the corpus runner.
//!
//! One sample is driven from a machine reset to either a validated
//! completion or an abandonment. The loop is the rejection-sampling pattern
//! made explicit: sample an action uniformly from the (optionally
//! rule-restricted) valid set, apply it, and on an alignment failure reset
//! the machine and try a fresh trajectory — at most `retry_budget` times
//! per sample before giving up on it.
//!
//! The state machine is spelled out as [`DriveState`] rather than nested
//! control flow, so the retry budget and the abandonment condition are
//! independently visible and testable:
//!
//! ```text
//! Reset → Stepping → RetryCheck → {Reset | Abandoned}
//!              ↓
//!           Closed
//! ```

use crate::check::{check_alignment, ConsistencyReport};
use crate::diagnostics::RejectionStats;
use crate::errors::{OracleError, Result};
use crate::machine::{SurfaceAligner, TransitionMachine};
use crate::rules::{restrict_actions, SurfaceRuleIndex};
use crate::score::ScoreAggregator;
use crate::types::{OracleConfig, Sample};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Rejection reason recorded when an open machine offers no actions at all.
const NO_VALID_ACTIONS: &str = "machine offered no valid actions while open";

// ============================================================================
// Cancellation
// ============================================================================

/// Shared cancellation handle checked once per stepping iteration.
///
/// Cloning yields another handle to the same flag, so a supervisor can keep
/// one clone and hand the driver the other. Cancellation surfaces as
/// [`OracleError::Cancelled`] from the running call.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Sample outcomes
// ============================================================================

/// What one sample produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SampleOutcome {
    /// The machine closed; the sample was checked and can be scored.
    Completed(SampleReport),
    /// The retry budget was exhausted; the sample contributes no score but
    /// its rejections remain in the diagnostics.
    Abandoned {
        /// Rejections recorded for this sample id when it was given up
        rejections: u32,
    },
}

/// Score-relevant facts about one completed sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleReport {
    /// Sample identifier
    pub sample_id: String,
    /// Decoded edge count (the sample's tries)
    pub tries: usize,
    /// Gold edge count
    pub gold_edges: usize,
    /// Consistency check outcome
    pub consistency: ConsistencyReport,
    /// The machine's opaque rendering of the decoded graph
    pub annotation: String,
    /// Machine resets this sample needed (1 = first trajectory succeeded)
    pub resets: u32,
}

impl SampleReport {
    /// Decoded edges that matched a gold edge after translation
    pub fn hits(&self) -> usize {
        self.tries.saturating_sub(self.consistency.missing_edges.len())
    }
}

/// Aggregate outcome of a corpus run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusReport {
    /// Samples that closed and were scored
    pub completed: usize,
    /// Samples abandoned after exhausting the retry budget
    pub abandoned: usize,
    /// Edge-level totals over completed samples
    pub scores: ScoreAggregator,
    /// Rejection diagnostics over all samples, completed or not
    pub rejections: RejectionStats,
    /// Machine annotations of completed samples, in corpus order
    pub annotations: Vec<String>,
}

impl CorpusReport {
    /// Derive the corpus metrics; fails on degenerate totals.
    pub fn metrics(&self) -> Result<crate::score::Scores> {
        self.scores.metrics()
    }

    /// Render the report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Drive state
// ============================================================================

/// Explicit per-sample state machine.
#[derive(Debug)]
enum DriveState {
    /// (Re-)initialize the machine; entry point and retry target.
    Reset,
    /// Sample and apply actions until closed or failed.
    Stepping,
    /// Account for a failure and decide between Reset and Abandoned.
    RetryCheck { reason: String },
    /// Terminal: machine closed, sample goes to the consistency check.
    Closed,
    /// Terminal: retry budget exhausted, sample is skipped for scoring.
    Abandoned,
}

// ============================================================================
// AlignmentDriver
// ============================================================================

/// Drives samples through an external transition machine.
///
/// The driver owns the random source (seeded from the config for
/// reproducible trajectories), the rejection diagnostics, and the
/// cancellation flag. The machine is borrowed per call, so a single
/// machine instance can serve the whole corpus, reset between samples.
#[derive(Debug)]
pub struct AlignmentDriver<R: Rng = ChaCha8Rng> {
    config: OracleConfig,
    rng: R,
    stats: RejectionStats,
    cancel: CancellationFlag,
}

impl AlignmentDriver<ChaCha8Rng> {
    /// Create a driver with the config's seed driving a ChaCha8 stream.
    pub fn new(config: OracleConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> AlignmentDriver<R> {
    /// Create a driver with an externally-constructed random source.
    pub fn with_rng(config: OracleConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            stats: RejectionStats::new(),
            cancel: CancellationFlag::new(),
        }
    }

    /// The driver's configuration
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Rejection diagnostics accumulated so far
    pub fn stats(&self) -> &RejectionStats {
        &self.stats
    }

    /// A handle to the driver's cancellation flag
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Drive one sample to completion or abandonment.
    ///
    /// `rules` narrows the machine's valid actions per step when present;
    /// pass `None` to sample from the unrestricted set. Alignment failures
    /// from the machine's update are absorbed into the retry loop; any
    /// other machine error — and an observed cancellation — propagates.
    pub fn run_sample<M: TransitionMachine + ?Sized>(
        &mut self,
        machine: &mut M,
        sample: &Sample,
        rules: Option<&SurfaceRuleIndex>,
    ) -> Result<SampleOutcome> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("align_sample", id = %sample.id).entered();

        let mut state = DriveState::Reset;
        let mut resets: u32 = 0;

        loop {
            match state {
                DriveState::Reset => {
                    machine.reset(&sample.tokens, &sample.graph);
                    resets += 1;
                    state = DriveState::Stepping;
                }

                DriveState::Stepping => {
                    if self.cancel.is_cancelled() {
                        return Err(OracleError::Cancelled);
                    }
                    if machine.is_closed() {
                        state = DriveState::Closed;
                        continue;
                    }

                    let possible = machine.valid_actions();
                    let narrowed = match rules {
                        Some(index) => {
                            restrict_actions(machine.tok_cursor(), &possible, index)
                        }
                        None => possible,
                    };

                    let Some(action) = narrowed.choose(&mut self.rng).cloned() else {
                        // An open machine with nothing to offer is stuck the
                        // same way a failed alignment is.
                        state = DriveState::RetryCheck {
                            reason: NO_VALID_ACTIONS.to_string(),
                        };
                        continue;
                    };

                    match machine.update(&action) {
                        Ok(()) => {}
                        Err(OracleError::Inconsistent { reason }) => {
                            state = DriveState::RetryCheck { reason };
                        }
                        Err(other) => return Err(other),
                    }
                }

                DriveState::RetryCheck { reason } => {
                    self.stats
                        .record(&sample.id, &reason, sample.graph.num_nodes());

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        id = %sample.id,
                        %reason,
                        rejections = self.stats.rejections(&sample.id),
                        "alignment rejected"
                    );

                    if self.stats.rejections(&sample.id) > self.config.retry_budget as u32 {
                        state = DriveState::Abandoned;
                    } else {
                        state = DriveState::Reset;
                    }
                }

                DriveState::Closed => {
                    let consistency = check_alignment(machine);

                    #[cfg(feature = "tracing")]
                    if !consistency.is_clean() {
                        tracing::debug!(
                            id = %sample.id,
                            missing_nodes = consistency.missing_nodes.len(),
                            missing_edges = consistency.missing_edges.len(),
                            excess_edges = consistency.excess_edges.len(),
                            "structural mismatch on completed sample"
                        );
                    }

                    return Ok(SampleOutcome::Completed(SampleReport {
                        sample_id: sample.id.clone(),
                        tries: machine.edges().len(),
                        gold_edges: sample.graph.num_edges(),
                        consistency,
                        annotation: machine.annotation(),
                        resets,
                    }));
                }

                DriveState::Abandoned => {
                    return Ok(SampleOutcome::Abandoned {
                        rejections: self.stats.rejections(&sample.id),
                    });
                }
            }
        }
    }

    /// Drive every sample in order and aggregate the results.
    ///
    /// Samples run strictly one after another. When surface rules are
    /// enabled in the config, the `aligner` computes each sample's surface
    /// alignment and the derived rule index narrows the action choice; with
    /// rules disabled (or no aligner supplied) sampling is unrestricted.
    pub fn run_corpus<M: TransitionMachine + ?Sized>(
        &mut self,
        machine: &mut M,
        samples: &[Sample],
        aligner: Option<&dyn SurfaceAligner>,
    ) -> Result<CorpusReport> {
        self.config.validate()?;

        let mut scores = ScoreAggregator::new();
        let mut annotations = Vec::new();
        let mut completed = 0;
        let mut abandoned = 0;

        for sample in samples {
            let rules = match (self.config.use_surface_rules, aligner) {
                (true, Some(aligner)) => {
                    let pairs = sample.graph.id_concept_pairs();
                    let alignment = aligner.align(&sample.tokens, &pairs);
                    Some(SurfaceRuleIndex::build(
                        &sample.tokens,
                        &sample.graph,
                        &alignment,
                    ))
                }
                _ => None,
            };

            match self.run_sample(machine, sample, rules.as_ref())? {
                SampleOutcome::Completed(report) => {
                    completed += 1;
                    scores.observe(
                        report.tries,
                        report.consistency.missing_edges.len(),
                        report.gold_edges,
                    );
                    annotations.push(report.annotation);
                }
                SampleOutcome::Abandoned { .. } => {
                    abandoned += 1;
                }
            }
        }

        Ok(CorpusReport {
            completed,
            abandoned,
            scores,
            rejections: self.stats.clone(),
            annotations,
        })
    }
}
