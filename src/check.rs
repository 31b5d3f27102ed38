//! Post-hoc consistency check over a completed sample.
//!
//! Once the machine closes without a pending alignment failure, the decoded
//! graph should mirror the gold graph under the machine's alignment map.
//! [`check_alignment`] inverts that map, translates every decoded edge into
//! gold-identifier space, and reports what is missing or in excess. The
//! check is diagnostic: it never mutates the machine and never triggers a
//! retry — a non-clean report only shows up as fewer hits in the score.

use crate::machine::TransitionMachine;
use crate::types::Edge;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Outcome of the consistency check for one completed sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Gold nodes the machine finished without aligning
    pub missing_nodes: Vec<String>,
    /// Gold edges absent from the translated decoded edges
    pub missing_edges: Vec<Edge>,
    /// Translated decoded edges absent from the gold edges
    pub excess_edges: Vec<Edge>,
    /// Decoded edges with both endpoints translatable, in gold-id space
    pub translated_edges: Vec<Edge>,
}

impl ConsistencyReport {
    /// True when every gold node and edge has a decoded counterpart and
    /// nothing extra was decoded.
    pub fn is_clean(&self) -> bool {
        self.missing_nodes.is_empty()
            && self.missing_edges.is_empty()
            && self.excess_edges.is_empty()
    }
}

/// Check a closed machine's decoded graph against its gold graph.
///
/// The alignment map may relate one gold node to several decoded nodes; the
/// inversion takes the first decoded id of each sequence as canonical, and
/// walks gold-graph insertion order so "first" is deterministic. Decoded
/// edges with an untranslatable endpoint are dropped from the translated
/// set — they count neither as missing nor as excess.
pub fn check_alignment<M: TransitionMachine + ?Sized>(machine: &M) -> ConsistencyReport {
    let gold = machine.gold();
    let gold2dec = machine.flat_alignment(true);

    let missing_nodes: Vec<String> = gold
        .nodes()
        .iter()
        .filter(|n| !gold2dec.contains_key(&n.id))
        .map(|n| n.id.clone())
        .collect();

    // decoded id → gold id, first decoded id per gold node wins
    let mut dec2gold: FxHashMap<String, String> = FxHashMap::default();
    for node in gold.nodes() {
        if let Some(first) = gold2dec.get(&node.id).and_then(|ids| ids.first()) {
            dec2gold
                .entry(first.clone())
                .or_insert_with(|| node.id.clone());
        }
    }

    let translated_edges: Vec<Edge> = machine
        .edges()
        .iter()
        .filter_map(|e| {
            match (dec2gold.get(&e.source), dec2gold.get(&e.target)) {
                (Some(src), Some(dst)) => Some(Edge::new(src.clone(), e.label.clone(), dst.clone())),
                _ => None,
            }
        })
        .collect();

    let translated_set: FxHashSet<&Edge> = translated_edges.iter().collect();
    let gold_set: FxHashSet<&Edge> = gold.edges().iter().collect();

    let missing_edges: Vec<Edge> = gold
        .edges()
        .iter()
        .filter(|e| !translated_set.contains(*e))
        .cloned()
        .collect();

    // Excess edges deduplicated, first occurrence order.
    let mut seen: FxHashSet<&Edge> = FxHashSet::default();
    let excess_edges: Vec<Edge> = translated_edges
        .iter()
        .filter(|e| !gold_set.contains(*e) && seen.insert(*e))
        .cloned()
        .collect();

    ConsistencyReport {
        missing_nodes,
        missing_edges,
        excess_edges,
        translated_edges,
    }
}
