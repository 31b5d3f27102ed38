//! Core types for amr_oracle
//!
//! This module defines the data model shared by every component: actions,
//! the gold graph, surface alignments, corpus samples, and the driver
//! configuration.

use crate::errors::{OracleError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Action
// ============================================================================

/// A single transition-machine action, identified by its label.
///
/// The machine's action grammar is opaque to this crate: actions are
/// compared, hashed, and sampled purely by label identity. Node-predicting
/// actions carry the node's concept as their label, which is what the
/// surface-rule restriction intersects against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    /// Create an action from its label
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The action's label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Action {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for Action {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Gold graph
// ============================================================================

/// A node of the gold graph: stable identifier plus concept label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldNode {
    /// Stable node identifier
    pub id: String,
    /// Concept label carried by the node
    pub concept: String,
}

/// A directed labeled edge `(source, label, target)`.
///
/// Edge equality is exact triple equality; there is no label normalization
/// at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub label: String,
    pub target: String,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        source: impl Into<String>,
        label: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            label: label.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.source, self.label, self.target)
    }
}

/// The ground-truth semantic graph for one sentence.
///
/// Nodes are kept in insertion order so that every listing derived from the
/// graph (missing nodes, rule construction, node/concept pairs handed to a
/// surface aligner) is deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoldGraph {
    nodes: Vec<GoldNode>,
    edges: Vec<Edge>,
}

impl GoldGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Identifiers are assumed unique; the graph does not
    /// deduplicate.
    pub fn add_node(&mut self, id: impl Into<String>, concept: impl Into<String>) {
        self.nodes.push(GoldNode {
            id: id.into(),
            concept: concept.into(),
        });
    }

    /// Add a directed labeled edge between node identifiers.
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        label: impl Into<String>,
        target: impl Into<String>,
    ) {
        self.edges.push(Edge::new(source, label, target));
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[GoldNode] {
        &self.nodes
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Concept label of a node, if the identifier is known.
    ///
    /// Linear scan: gold graphs are sentence-bounded, so an index buys
    /// nothing here.
    pub fn concept(&self, id: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.concept.as_str())
    }

    /// Whether a node identifier is present
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// `(id, concept)` pairs in insertion order, the shape consumed by a
    /// [`SurfaceAligner`](crate::machine::SurfaceAligner).
    pub fn id_concept_pairs(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), n.concept.clone()))
            .collect()
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// True when the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// Surface alignment
// ============================================================================

/// One token position evidencing a node, with the evidence string that
/// produced the match (kept for diagnostics only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedSpan {
    /// Token position in `[0, token_count)`
    pub position: usize,
    /// What matched at that position
    pub evidence: String,
}

/// Externally-computed mapping from node identifier to the ordered token
/// positions that evidence it.
///
/// A node may be evidenced at several positions, or at none; nodes without
/// an entry simply have no surface evidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceAlignment {
    spans: FxHashMap<String, Vec<AlignedSpan>>,
}

impl SurfaceAlignment {
    /// Create an empty alignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evidenced position for a node
    pub fn add(&mut self, node_id: impl Into<String>, position: usize, evidence: impl Into<String>) {
        self.spans.entry(node_id.into()).or_default().push(AlignedSpan {
            position,
            evidence: evidence.into(),
        });
    }

    /// Evidenced spans for a node, in recording order
    pub fn get(&self, node_id: &str) -> Option<&[AlignedSpan]> {
        self.spans.get(node_id).map(|v| v.as_slice())
    }

    /// Number of nodes with at least one recorded span
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True when no node has recorded spans
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

// ============================================================================
// Sample
// ============================================================================

/// One corpus entry: identifier, token sequence, and gold graph.
///
/// The identifier keys the rejection diagnostics, so it should be stable
/// across retries and corpus runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Stable sample identifier (e.g. the annotation id from the corpus)
    pub id: String,
    /// Token sequence, immutable for the sample's lifetime
    pub tokens: Vec<String>,
    /// Gold graph over the tokens
    pub graph: GoldGraph,
}

impl Sample {
    /// Create a new sample
    pub fn new(id: impl Into<String>, tokens: Vec<String>, graph: GoldGraph) -> Self {
        Self {
            id: id.into(),
            tokens,
            graph,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Default number of rejections tolerated per sample before abandonment.
pub const DEFAULT_RETRY_BUDGET: usize = 10;

/// Configuration for the alignment driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Rejections tolerated per sample id before the sample is abandoned.
    /// An always-failing sample performs `retry_budget + 1` resets.
    pub retry_budget: usize,
    /// Seed for the driver's random source; identical seeds reproduce
    /// identical trajectories against a deterministic machine.
    pub seed: u64,
    /// Narrow the machine's valid actions with surface-alignment rules.
    #[serde(default)]
    pub use_surface_rules: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
            seed: 0,
            use_surface_rules: false,
        }
    }
}

impl OracleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.retry_budget == 0 {
            return Err(OracleError::invalid_config("retry_budget must be > 0"));
        }
        Ok(())
    }

    /// Builder method: set the retry budget
    pub fn with_retry_budget(mut self, retry_budget: usize) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Builder method: set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method: enable or disable surface-rule restriction
    pub fn with_surface_rules(mut self, enabled: bool) -> Self {
        self.use_surface_rules = enabled;
        self
    }
}
