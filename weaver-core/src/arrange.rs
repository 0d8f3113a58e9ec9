//! Stacking order of top-level nodes.
//!
//! These are pure functions over the z values of the top-level list, in
//! document order. [`crate::Design`] applies whatever entries they change.

use std::sync::Arc;

use crate::node::CanvasNode;

/// Z values after moving entry `i` above every other entry.
#[must_use]
pub fn bring_to_front(zs: &[u32], i: usize) -> Vec<u32> {
    let mut out = zs.to_vec();
    if i >= out.len() {
        return out;
    }
    let max = zs.iter().copied().max().unwrap_or(0);
    out[i] = max.saturating_add(1);
    out
}

/// Z values after moving entry `i` below every other entry.
///
/// Entry `i` takes one less than the lowest other value, floored at 1. When
/// the floor is hit, the others are shifted up (keeping their relative
/// order, ties broken by document order) so every value stays distinct and
/// entry `i` stays strictly lowest.
#[must_use]
pub fn send_to_back(zs: &[u32], i: usize) -> Vec<u32> {
    let mut out = zs.to_vec();
    if i >= out.len() {
        return out;
    }

    let others_min = zs
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, &z)| z)
        .min();

    match others_min {
        None => out[i] = 1,
        Some(m) if m > 1 => out[i] = m - 1,
        Some(_) => {
            out[i] = 1;
            let mut others: Vec<usize> = (0..zs.len()).filter(|&j| j != i).collect();
            others.sort_by_key(|&j| (zs[j], j));
            let mut previous = 1;
            for j in others {
                let z = zs[j].max(previous + 1);
                out[j] = z;
                previous = z;
            }
        }
    }
    out
}

/// Top-level nodes sorted by ascending z, document order breaking ties.
#[must_use]
pub fn stacking_order(forest: &[Arc<CanvasNode>]) -> Vec<&Arc<CanvasNode>> {
    let mut ordered: Vec<_> = forest.iter().collect();
    ordered.sort_by_key(|node| node.layout.z_index);
    ordered
}
