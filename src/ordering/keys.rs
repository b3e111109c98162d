//! Hierarchical Sort Keys
//!
//! Both encodings process groups shallowest first (ties by base rank), so a
//! parent's key is final before any child reads it, then leaves.

use std::cmp::Ordering;

use super::hierarchy::Hierarchy;

/// Groups ascending by (depth, rank), followed by every leaf
fn processing_order(hierarchy: &Hierarchy, ranks: &[usize]) -> Vec<usize> {
    let mut groups: Vec<usize> = (0..ranks.len()).filter(|&i| hierarchy.is_group(i)).collect();
    groups.sort_by_key(|&i| (hierarchy.depth(i), ranks[i]));
    groups.extend((0..ranks.len()).filter(|&i| !hierarchy.is_group(i)));
    groups
}

/// Base ranks from the root ancestor down to each chip
pub(crate) fn rank_paths(hierarchy: &Hierarchy, ranks: &[usize]) -> Vec<Vec<usize>> {
    let mut paths: Vec<Vec<usize>> = vec![Vec::new(); ranks.len()];

    for index in processing_order(hierarchy, ranks) {
        let mut path = match hierarchy.parent(index) {
            Some(parent) => {
                let mut path = Vec::with_capacity(paths[parent].len() + 1);
                path.extend_from_slice(&paths[parent]);
                path
            }
            None => Vec::with_capacity(1),
        };
        path.push(ranks[index]);
        paths[index] = path;
    }

    paths
}

/// Power-of-ten keys: `parent + rank * 10^(max_depth + 5 - 3 * depth)` for
/// groups and `parent + rank` for leaves
pub(crate) fn scaled_keys(hierarchy: &Hierarchy, ranks: &[usize]) -> Vec<f64> {
    let max_depth = hierarchy.max_group_depth() as i32;
    let mut keys: Vec<f64> = ranks.iter().map(|&rank| rank as f64).collect();

    for index in processing_order(hierarchy, ranks) {
        let parent_key = hierarchy.parent(index).map_or(0.0, |parent| keys[parent]);
        let rank = ranks[index] as f64;
        keys[index] = if hierarchy.is_group(index) {
            let exponent = max_depth + 5 - hierarchy.depth(index) as i32 * 3;
            parent_key + rank * 10f64.powi(exponent)
        } else {
            parent_key + rank
        };
    }

    keys
}

/// Sort indices by precomputed keys, falling back to base rank
pub(crate) fn order_by<K>(
    keys: &[K],
    ranks: &[usize],
    cmp: impl Fn(&K, &K) -> Ordering,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| cmp(&keys[a], &keys[b]).then(ranks[a].cmp(&ranks[b])));
    order
}
