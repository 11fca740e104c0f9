//! Label vector normalization.

use std::collections::HashMap;

/// Renumbers labels to `0..c` in order of first appearance.
///
/// After compaction `cluster_count(labels) == number of distinct labels`.
pub fn compact(labels: &[usize]) -> Vec<usize> {
    let mut mapping = HashMap::new();
    labels
        .iter()
        .map(|&label| {
            let next = mapping.len();
            *mapping.entry(label).or_insert(next)
        })
        .collect()
}

/// `max(label) + 1`, or 0 for an empty assignment.
pub fn cluster_count(labels: &[usize]) -> usize {
    labels.iter().max().map_or(0, |&m| m + 1)
}
