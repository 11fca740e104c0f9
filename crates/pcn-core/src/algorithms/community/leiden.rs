use super::{AggregateGraph, GAIN_EPSILON};
use crate::algorithms::labels;
use crate::core::models::network::ContactNetwork;
use std::collections::VecDeque;
use tracing::debug;

const MAX_LEVELS: usize = 64;

/// Queue-based local moving: only neighbors of moved nodes are revisited.
fn move_nodes_fast(graph: &AggregateGraph, partition: &mut [usize]) {
    let n = graph.len();
    let m2 = graph.total_strength;
    let mut totals = vec![0.0; n];
    let mut sizes = vec![0usize; n];
    for (v, &c) in partition.iter().enumerate() {
        totals[c] += graph.strength[v];
        sizes[c] += 1;
    }
    let mut empty: Vec<usize> = (0..n).rev().filter(|&c| sizes[c] == 0).collect();

    let mut queue: VecDeque<usize> = (0..n).collect();
    let mut queued = vec![true; n];

    while let Some(v) = queue.pop_front() {
        queued[v] = false;
        let k = graph.strength[v];
        let current = partition[v];
        totals[current] -= k;
        sizes[current] -= 1;

        let links = graph.community_links(v, partition);
        let own_link = links
            .iter()
            .find(|(c, _)| *c == current)
            .map_or(0.0, |&(_, w)| w);
        let mut best = current;
        let mut best_gain = own_link - totals[current] * k / m2;
        for &(c, w) in &links {
            let gain = w - totals[c] * k / m2;
            if gain > best_gain + GAIN_EPSILON {
                best = c;
                best_gain = gain;
            }
        }
        if best_gain < -GAIN_EPSILON && sizes[current] > 0 {
            while let Some(c) = empty.pop() {
                if sizes[c] == 0 && c != current {
                    best = c;
                    break;
                }
            }
        }

        totals[best] += k;
        sizes[best] += 1;
        if best != current {
            partition[v] = best;
            if sizes[current] == 0 {
                empty.push(current);
            }
            for &(u, _) in &graph.neighbors[v] {
                if !queued[u] && partition[u] != best {
                    queued[u] = true;
                    queue.push_back(u);
                }
            }
        }
    }
}

/// Splits every community of `partition` into well-connected sub-communities.
///
/// Within a community `S`, singleton nodes that are well connected to `S` are merged
/// greedily into the well-connected sub-community with the largest non-negative gain.
fn refine(graph: &AggregateGraph, partition: &[usize]) -> Vec<usize> {
    let n = graph.len();
    let m2 = graph.total_strength;
    let mut refined: Vec<usize> = (0..n).collect();
    let mut totals = graph.strength.clone();
    let mut sizes = vec![1usize; n];

    let count = labels::cluster_count(partition);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (v, &c) in partition.iter().enumerate() {
        members[c].push(v);
    }

    // Weight from each refined community to the rest of its parent community.
    let mut external: Vec<f64> = (0..n)
        .map(|v| {
            graph.neighbors[v]
                .iter()
                .filter(|&&(u, _)| partition[u] == partition[v])
                .map(|&(_, w)| w)
                .sum()
        })
        .collect();

    for nodes in &members {
        let parent_total: f64 = nodes.iter().map(|&v| graph.strength[v]).sum();
        for &v in nodes {
            if sizes[refined[v]] != 1 {
                continue;
            }
            let k = graph.strength[v];
            if external[v] < k * (parent_total - k) / m2 {
                continue;
            }

            let mut best = None;
            let mut best_gain = 0.0;
            let mut best_link = 0.0;
            // Refined ids are node ids, so `partition[c]` is the parent of community `c`.
            for (c, link) in graph.community_links(v, &refined) {
                if c == refined[v] || partition[c] != partition[v] {
                    continue;
                }
                let well_connected = external[c] >= totals[c] * (parent_total - totals[c]) / m2;
                if !well_connected {
                    continue;
                }
                let gain = link - totals[c] * k / m2;
                if gain >= 0.0 && (best.is_none() || gain > best_gain + GAIN_EPSILON) {
                    best = Some(c);
                    best_gain = gain;
                    best_link = link;
                }
            }

            if let Some(c) = best {
                let own = refined[v];
                external[c] = external[c] + external[v] - 2.0 * best_link;
                totals[c] += k;
                sizes[c] += 1;
                sizes[own] = 0;
                refined[v] = c;
            }
        }
    }
    labels::compact(&refined)
}

/// The Leiden algorithm (Traag et al.): local moving, refinement, and aggregation on the
/// refined partition.
pub fn leiden(network: &ContactNetwork) -> Vec<usize> {
    let mut graph = AggregateGraph::from_network(network);
    let mut membership: Vec<usize> = (0..network.len()).collect();
    if graph.total_strength == 0.0 {
        return membership;
    }

    let mut partition: Vec<usize> = (0..graph.len()).collect();
    for level in 0..MAX_LEVELS {
        move_nodes_fast(&graph, &mut partition);
        partition = labels::compact(&partition);
        if labels::cluster_count(&partition) == graph.len() {
            break;
        }

        let refined = refine(&graph, &partition);
        let basis = if labels::cluster_count(&refined) < graph.len() {
            refined
        } else {
            partition.clone()
        };

        let mut initial = vec![0; labels::cluster_count(&basis)];
        for (v, &b) in basis.iter().enumerate() {
            initial[b] = partition[v];
        }
        for m in membership.iter_mut() {
            *m = basis[*m];
        }
        graph = graph.aggregate(&basis);
        partition = initial;
        debug!(level, nodes = graph.len(), "Leiden level aggregated.");
    }

    let assigned: Vec<usize> = membership.iter().map(|&m| partition[m]).collect();
    labels::compact(&assigned)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn finds_disconnected_components() {
        assert_eq!(leiden(&two_cliques(4)), halves(4));
    }

    #[test]
    fn splits_a_barbell_at_the_bridge() {
        assert_eq!(leiden(&barbell(5)), halves(5));
    }

    #[test]
    fn refinement_never_merges_across_parents() {
        let net = barbell(4);
        let graph = AggregateGraph::from_network(&net);
        let refined = refine(&graph, &halves(4));
        for i in 0..4 {
            for j in 4..8 {
                assert_ne!(refined[i], refined[j]);
            }
        }
    }

    #[test]
    fn empty_network_gives_singletons() {
        assert_eq!(leiden(&network(&[], 4)), vec![0, 1, 2, 3]);
    }
}
