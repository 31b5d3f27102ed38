//! Position-indexed surface rules, rebuilt once per sample.

use crate::types::{Action, GoldGraph, SurfaceAlignment};
use rustc_hash::{FxHashMap, FxHashSet};

/// Inversion of a surface alignment into per-position candidate rules.
///
/// `rules_by_position` maps a token position to the node actions the
/// alignment evidences there; positions with no evidence have no entry.
/// `future_rules[i]` holds the union of every rule evidenced at a position
/// strictly greater than `i` — the actions that belong to the future and
/// must not be chosen while the cursor stands at `i`.
///
/// Building is a pure function of its inputs: spans naming unknown nodes or
/// out-of-range positions are skipped, and degenerate input (an empty
/// alignment) yields empty indexes, which the filter treats as
/// "no restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceRuleIndex {
    rules_by_position: FxHashMap<usize, Vec<Action>>,
    future_rules: Vec<FxHashSet<Action>>,
}

impl SurfaceRuleIndex {
    /// Build the index for one sample.
    ///
    /// Nodes are visited in gold-graph insertion order, so the per-position
    /// rule lists are deterministic across runs. `future_rules` is computed
    /// as a suffix union over positions, right to left.
    pub fn build(tokens: &[String], gold: &GoldGraph, alignment: &SurfaceAlignment) -> Self {
        let n = tokens.len();

        let mut rules_by_position: FxHashMap<usize, Vec<Action>> = FxHashMap::default();
        for node in gold.nodes() {
            let Some(spans) = alignment.get(&node.id) else {
                continue;
            };
            for span in spans {
                if span.position >= n {
                    continue;
                }
                rules_by_position
                    .entry(span.position)
                    .or_default()
                    .push(Action::from(node.concept.as_str()));
            }
        }

        // future_rules[i] = union of rules_by_position[j] for all j > i
        let mut future_rules = vec![FxHashSet::default(); n];
        for i in (0..n.saturating_sub(1)).rev() {
            let mut set = future_rules[i + 1].clone();
            if let Some(rules) = rules_by_position.get(&(i + 1)) {
                set.extend(rules.iter().cloned());
            }
            future_rules[i] = set;
        }

        Self {
            rules_by_position,
            future_rules,
        }
    }

    /// Rules evidenced exactly at `position`, if any.
    pub fn rules_at(&self, position: usize) -> Option<&[Action]> {
        self.rules_by_position.get(&position).map(|v| v.as_slice())
    }

    /// Rules evidenced strictly after `position`. `None` past the token
    /// range (a cursor there has no future to forbid).
    pub fn future_at(&self, position: usize) -> Option<&FxHashSet<Action>> {
        self.future_rules.get(position)
    }

    /// Number of positions with at least one rule.
    pub fn num_positions(&self) -> usize {
        self.rules_by_position.len()
    }

    /// True when the alignment evidenced nothing anywhere.
    pub fn is_empty(&self) -> bool {
        self.rules_by_position.is_empty()
    }
}
