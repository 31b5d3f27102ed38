//! Fake transition machines shared by the integration tests.

use amr_oracle::errors::Result;
use amr_oracle::{Action, Edge, GoldGraph, OracleError, TransitionMachine};
use rustc_hash::{FxHashMap, FxHashSet};

/// A machine that reconstructs its gold graph under action choice.
///
/// Actions are the gold concepts (decode the first undecoded node carrying
/// that concept), plus `SHIFT` (advance the cursor) and `CLOSE` (offered
/// only once every node is decoded). Any trajectory that closes therefore
/// decodes the full gold graph, and the decoded edge set mirrors the gold
/// edge set under the alignment map.
pub struct MirrorMachine {
    tokens: Vec<String>,
    gold: GoldGraph,
    cursor: usize,
    closed: bool,
    /// Resets observed, across every sample this instance served
    pub resets: u32,
    /// Updates that fail with an inconsistency before behaving normally
    fail_remaining: u32,
    decoded_of: FxHashMap<String, String>,
    decoded_edges: Vec<Edge>,
    materialized: FxHashSet<usize>,
}

impl MirrorMachine {
    pub fn new() -> Self {
        Self::with_failures(0)
    }

    /// A machine whose first `failures` updates raise an inconsistency
    /// (counted across resets), then behave normally.
    pub fn with_failures(failures: u32) -> Self {
        Self {
            tokens: Vec::new(),
            gold: GoldGraph::new(),
            cursor: 0,
            closed: false,
            resets: 0,
            fail_remaining: failures,
            decoded_of: FxHashMap::default(),
            decoded_edges: Vec::new(),
            materialized: FxHashSet::default(),
        }
    }

    fn all_decoded(&self) -> bool {
        self.decoded_of.len() == self.gold.num_nodes()
    }

    fn decode(&mut self, concept: &str) -> Result<()> {
        let node_id = self
            .gold
            .nodes()
            .iter()
            .find(|n| n.concept == concept && !self.decoded_of.contains_key(&n.id))
            .map(|n| n.id.clone())
            .ok_or_else(|| {
                OracleError::inconsistent(format!("no undecoded node for action {concept}"))
            })?;

        let dec_id = format!("d{}", self.decoded_of.len());
        self.decoded_of.insert(node_id, dec_id);

        // Materialize every gold edge whose endpoints are now both decoded.
        for (i, edge) in self.gold.edges().iter().enumerate() {
            if self.materialized.contains(&i) {
                continue;
            }
            if let (Some(src), Some(dst)) = (
                self.decoded_of.get(&edge.source),
                self.decoded_of.get(&edge.target),
            ) {
                self.decoded_edges
                    .push(Edge::new(src.clone(), edge.label.clone(), dst.clone()));
                self.materialized.insert(i);
            }
        }
        Ok(())
    }
}

impl TransitionMachine for MirrorMachine {
    fn reset(&mut self, tokens: &[String], gold: &GoldGraph) {
        self.tokens = tokens.to_vec();
        self.gold = gold.clone();
        self.cursor = 0;
        self.closed = false;
        self.resets += 1;
        self.decoded_of.clear();
        self.decoded_edges.clear();
        self.materialized.clear();
    }

    fn valid_actions(&self) -> Vec<Action> {
        if self.closed {
            return Vec::new();
        }

        let mut actions = Vec::new();
        let mut offered: FxHashSet<&str> = FxHashSet::default();
        for node in self.gold.nodes() {
            if !self.decoded_of.contains_key(&node.id) && offered.insert(node.concept.as_str()) {
                actions.push(Action::from(node.concept.as_str()));
            }
        }
        if self.cursor < self.tokens.len() {
            actions.push(Action::from("SHIFT"));
        }
        if self.all_decoded() {
            actions.push(Action::from("CLOSE"));
        }
        actions
    }

    fn update(&mut self, action: &Action) -> Result<()> {
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            return Err(OracleError::inconsistent("scripted failure"));
        }

        match action.as_str() {
            "SHIFT" => {
                if self.cursor >= self.tokens.len() {
                    return Err(OracleError::inconsistent("shift past last token"));
                }
                self.cursor += 1;
                Ok(())
            }
            "CLOSE" => {
                if !self.all_decoded() {
                    return Err(OracleError::inconsistent("close with undecoded nodes"));
                }
                self.closed = true;
                Ok(())
            }
            concept => self.decode(concept),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn tok_cursor(&self) -> usize {
        self.cursor
    }

    fn edges(&self) -> Vec<Edge> {
        self.decoded_edges.clone()
    }

    fn gold(&self) -> &GoldGraph {
        &self.gold
    }

    fn flat_alignment(&self, reverse: bool) -> FxHashMap<String, Vec<String>> {
        let mut map = FxHashMap::default();
        for (gold_id, dec_id) in &self.decoded_of {
            if reverse {
                map.insert(gold_id.clone(), vec![dec_id.clone()]);
            } else {
                map.insert(dec_id.clone(), vec![gold_id.clone()]);
            }
        }
        map
    }

    fn annotation(&self) -> String {
        // Gold-order listing keeps the rendering deterministic.
        let nodes: Vec<(String, String)> = self
            .gold
            .nodes()
            .iter()
            .filter_map(|n| {
                self.decoded_of
                    .get(&n.id)
                    .map(|d| (d.clone(), n.concept.clone()))
            })
            .collect();
        serde_json::json!({
            "nodes": nodes,
            "edges": self.decoded_edges,
        })
        .to_string()
    }
}

/// A machine whose every update raises an alignment inconsistency.
pub struct AlwaysFailMachine {
    gold: GoldGraph,
    pub resets: u32,
}

impl AlwaysFailMachine {
    pub fn new() -> Self {
        Self {
            gold: GoldGraph::new(),
            resets: 0,
        }
    }
}

impl TransitionMachine for AlwaysFailMachine {
    fn reset(&mut self, _tokens: &[String], gold: &GoldGraph) {
        self.gold = gold.clone();
        self.resets += 1;
    }

    fn valid_actions(&self) -> Vec<Action> {
        vec![Action::from("SHIFT")]
    }

    fn update(&mut self, _action: &Action) -> Result<()> {
        Err(OracleError::inconsistent("gold subgraph unreachable"))
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn tok_cursor(&self) -> usize {
        0
    }

    fn edges(&self) -> Vec<Edge> {
        Vec::new()
    }

    fn gold(&self) -> &GoldGraph {
        &self.gold
    }

    fn flat_alignment(&self, _reverse: bool) -> FxHashMap<String, Vec<String>> {
        FxHashMap::default()
    }

    fn annotation(&self) -> String {
        String::new()
    }
}
