//! # amr_oracle
//!
//! Oracle alignment between a gold semantic graph and the token sequence of
//! its sentence, driven through a transition-based state machine.
//!
//! The crate explores the machine's action space by sampling uniformly among
//! the currently valid actions, optionally narrowed by surface-alignment
//! rules, and restarts the machine (a bounded number of times) whenever the
//! sampled trajectory reaches a state that cannot be reconciled with the
//! gold graph. Completed samples are checked for structural consistency and
//! scored at the edge level (precision / recall / F-score).
//!
//! ## Components
//!
//! - [`SurfaceRuleIndex`] — per-sample inversion of a surface alignment into
//!   position-indexed candidate rules and their strictly-future complement.
//! - [`restrict_actions`] — narrows the machine's valid actions using the
//!   rule index, failing open when the narrowed set would be empty.
//! - [`AlignmentDriver`] — the per-sample control loop with bounded retries,
//!   plus a corpus runner that aggregates scores and diagnostics.
//! - [`check_alignment`] — post-hoc consistency check over the machine's
//!   alignment map (missing nodes, missing / excess edges).
//! - [`ScoreAggregator`] — corpus-wide edge-level hit/try/gold totals.
//!
//! The transition machine itself is external: the crate only consumes the
//! narrow [`TransitionMachine`] capability interface, so any machine (or a
//! lightweight fake) can be driven.

pub mod check;
pub mod diagnostics;
pub mod driver;
pub mod errors;
pub mod machine;
pub mod rules;
pub mod score;
pub mod types;

// Re-export commonly used types
pub use check::{check_alignment, ConsistencyReport};
pub use diagnostics::RejectionStats;
pub use driver::{
    AlignmentDriver, CancellationFlag, CorpusReport, SampleOutcome, SampleReport,
};
pub use errors::{OracleError, Result};
pub use machine::{SurfaceAligner, TransitionMachine};
pub use rules::{restrict_actions, SurfaceRuleIndex};
pub use score::{ScoreAggregator, Scores};
pub use types::{
    Action, AlignedSpan, Edge, GoldGraph, GoldNode, OracleConfig, Sample, SurfaceAlignment,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
