//! Action filtering against the surface-rule index.

use crate::rules::index::SurfaceRuleIndex;
use crate::types::Action;

/// Narrow the machine's valid actions using the surface rules at the
/// current cursor position.
///
/// When the cursor has rules of its own, the result is the intersection of
/// `possible` with those rules; otherwise it is `possible` minus every rule
/// evidenced strictly later. The order of `possible` is preserved in either
/// case, so the caller's uniform sampling stays deterministic under a fixed
/// seed.
///
/// Fail-open invariant: when the narrowed set would be empty, `possible` is
/// returned unmodified — the filter only narrows choice when a narrower,
/// non-empty choice exists. A single annotation gap must not deadlock the
/// whole sample.
pub fn restrict_actions(
    cursor: usize,
    possible: &[Action],
    index: &SurfaceRuleIndex,
) -> Vec<Action> {
    let restricted: Vec<Action> = if let Some(rules) = index.rules_at(cursor) {
        possible
            .iter()
            .filter(|a| rules.contains(*a))
            .cloned()
            .collect()
    } else if let Some(forbidden) = index.future_at(cursor) {
        possible
            .iter()
            .filter(|a| !forbidden.contains(*a))
            .cloned()
            .collect()
    } else {
        // Cursor past the indexed range: nothing to forbid.
        return possible.to_vec();
    };

    if restricted.is_empty() {
        possible.to_vec()
    } else {
        restricted
    }
}
