//! Capability traits for the external collaborators.
//!
//! The core never owns the transition system or the surface aligner; it
//! drives them through the narrow interfaces below. Implementations are
//! expected to be deterministic given their inputs — all randomness lives
//! in the driver.

use crate::errors::Result;
use crate::types::{Action, Edge, GoldGraph, SurfaceAlignment};
use rustc_hash::FxHashMap;

/// The transition state machine being driven.
///
/// The machine owns its cursor, decoded graph, and alignment map; the core
/// only resets it, queries it, and applies one sampled action at a time.
///
/// # Contract
///
/// - [`reset`](Self::reset) is idempotent and callable repeatedly on the
///   same instance; it discards any partial decoded state.
/// - [`valid_actions`](Self::valid_actions) is a pure query reflecting the
///   current cursor and decoded state.
/// - [`update`](Self::update) applies one action. When the action cannot be
///   reconciled with the gold graph at the current cursor it fails with
///   [`OracleError::Inconsistent`](crate::errors::OracleError::Inconsistent)
///   carrying a human-readable reason; any other error propagates out of
///   the driver unrecovered.
/// - [`tok_cursor`](Self::tok_cursor) is monotonically non-decreasing
///   between resets.
pub trait TransitionMachine {
    /// Re-initialize the machine for a sample. Clears partial decoded state.
    fn reset(&mut self, tokens: &[String], gold: &GoldGraph);

    /// Actions that are currently applicable. No side effects.
    fn valid_actions(&self) -> Vec<Action>;

    /// Apply one action, advancing the machine.
    fn update(&mut self, action: &Action) -> Result<()>;

    /// True once the machine has reached a terminal state.
    fn is_closed(&self) -> bool;

    /// Current token cursor.
    fn tok_cursor(&self) -> usize;

    /// Decoded edges so far, in decoded-identifier space.
    fn edges(&self) -> Vec<Edge>;

    /// The gold graph the machine was reset with.
    fn gold(&self) -> &GoldGraph;

    /// Flattened alignment map. `reverse = true` yields the gold-keyed map
    /// (gold id → decoded ids); `reverse = false` the decoded-keyed
    /// inverse. Each value sequence is ordered; callers treat the first
    /// element as canonical.
    fn flat_alignment(&self, reverse: bool) -> FxHashMap<String, Vec<String>>;

    /// Opaque serializable rendering of the finished decoded graph,
    /// passed through unmodified to the corpus report.
    fn annotation(&self) -> String;
}

/// Produces token-position evidence for gold nodes.
///
/// Invoked once per sample (when surface rules are enabled) with the
/// sample's tokens and the gold `(id, concept)` pairs in graph order.
pub trait SurfaceAligner {
    /// Compute the surface alignment for one sample.
    fn align(&self, tokens: &[String], nodes: &[(String, String)]) -> SurfaceAlignment;
}
