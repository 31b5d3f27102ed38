//! Property-based tests using proptest

use amr_oracle::*;
use proptest::prelude::*;
use rustc_hash::FxHashSet;

/// Build a gold graph with `concepts` distinct node concepts.
fn gold_with_concepts(concepts: usize) -> GoldGraph {
    let mut gold = GoldGraph::new();
    for i in 0..concepts {
        gold.add_node(format!("n{i}"), format!("c{i}"));
    }
    gold
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// future_rules[i] must equal the union of rules_by_position[j] for
    /// every j > i, and the last position must have no future.
    #[test]
    fn test_future_rules_match_bruteforce(
        n in 1usize..10,
        raw_spans in prop::collection::vec((0usize..5, 0usize..64), 0..24)
    ) {
        let tokens: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
        let gold = gold_with_concepts(5);

        let mut alignment = SurfaceAlignment::new();
        for (node, pos) in &raw_spans {
            alignment.add(format!("n{node}"), pos % n, "w");
        }

        let index = SurfaceRuleIndex::build(&tokens, &gold, &alignment);

        for i in 0..n {
            let mut expected: FxHashSet<Action> = FxHashSet::default();
            for j in (i + 1)..n {
                if let Some(rules) = index.rules_at(j) {
                    expected.extend(rules.iter().cloned());
                }
            }
            prop_assert_eq!(index.future_at(i).unwrap(), &expected);
        }
        prop_assert!(index.future_at(n - 1).unwrap().is_empty());
    }

    /// The filter never returns an empty set for a non-empty input.
    #[test]
    fn test_filter_fail_open(
        n in 1usize..10,
        raw_spans in prop::collection::vec((0usize..5, 0usize..64), 0..24),
        labels in prop::collection::vec("[a-d]c?[0-9]?", 1..8),
        cursor in 0usize..12
    ) {
        let tokens: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
        let gold = gold_with_concepts(5);

        let mut alignment = SurfaceAlignment::new();
        for (node, pos) in &raw_spans {
            alignment.add(format!("n{node}"), pos % n, "w");
        }
        let index = SurfaceRuleIndex::build(&tokens, &gold, &alignment);

        let possible: Vec<Action> = labels.iter().map(|l| Action::from(l.as_str())).collect();
        let restricted = restrict_actions(cursor, &possible, &index);

        prop_assert!(!restricted.is_empty());
        // Restriction only ever drops candidates, and only when some remain.
        for action in &restricted {
            prop_assert!(possible.contains(action));
        }
    }

    /// Building the index twice from identical inputs yields identical
    /// indexes.
    #[test]
    fn test_index_build_idempotent(
        n in 1usize..10,
        raw_spans in prop::collection::vec((0usize..5, 0usize..64), 0..24)
    ) {
        let tokens: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
        let gold = gold_with_concepts(5);

        let mut alignment = SurfaceAlignment::new();
        for (node, pos) in &raw_spans {
            alignment.add(format!("n{node}"), pos % n, "w");
        }

        let a = SurfaceRuleIndex::build(&tokens, &gold, &alignment);
        let b = SurfaceRuleIndex::build(&tokens, &gold, &alignment);
        prop_assert_eq!(a, b);
    }

    /// With hits ≤ tries (by construction) and hits ≤ gold (enforced when
    /// generating), precision and recall never exceed 1.
    #[test]
    fn test_metric_bounds(
        observations in prop::collection::vec(
            (0usize..20, 0usize..20, 0usize..10),
            1..12
        )
    ) {
        let mut agg = ScoreAggregator::new();
        for &(tries, raw_missing, extra_gold) in &observations {
            let missing = raw_missing.min(tries);
            // gold always covers the hits, as the consistency check
            // guarantees for real samples.
            let gold = (tries - missing) + extra_gold;
            agg.observe(tries, missing, gold);
        }

        prop_assert!(agg.hits() <= agg.tries());
        prop_assert!(agg.hits() <= agg.gold());

        match agg.metrics() {
            Ok(scores) => {
                prop_assert!(scores.precision <= 1.0);
                prop_assert!(scores.recall <= 1.0);
                prop_assert!(scores.fscore <= 1.0);
                prop_assert!(scores.fscore >= 0.0);
            }
            Err(OracleError::DegenerateMetric { tries, gold }) => {
                prop_assert!(tries == 0 || gold == 0);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }
}
