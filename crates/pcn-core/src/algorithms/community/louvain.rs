use super::{AggregateGraph, GAIN_EPSILON};
use crate::algorithms::labels;
use crate::core::models::network::ContactNetwork;
use tracing::debug;

/// Moves nodes between communities while modularity improves.
///
/// Nodes are visited in index order, pass after pass, until a full pass moves nothing.
/// Returns whether any node moved.
pub(crate) fn local_moving(graph: &AggregateGraph, partition: &mut [usize]) -> bool {
    let m2 = graph.total_strength;
    let mut totals = vec![0.0; graph.len()];
    for (v, &c) in partition.iter().enumerate() {
        totals[c] += graph.strength[v];
    }

    let mut any_moved = false;
    loop {
        let mut moved = false;
        for v in 0..graph.len() {
            let k = graph.strength[v];
            let current = partition[v];
            totals[current] -= k;

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

            totals[best] += k;
            if best != current {
                partition[v] = best;
                moved = true;
            }
        }
        if !moved {
            break;
        }
        any_moved = true;
    }
    any_moved
}

/// Multilevel modularity optimization (Blondel et al.).
pub fn louvain(network: &ContactNetwork) -> Vec<usize> {
    let mut graph = AggregateGraph::from_network(network);
    let mut membership: Vec<usize> = (0..network.len()).collect();
    if graph.total_strength == 0.0 {
        return membership;
    }

    let mut level = 0;
    loop {
        let mut partition: Vec<usize> = (0..graph.len()).collect();
        if !local_moving(&graph, &mut partition) {
            break;
        }
        let partition = labels::compact(&partition);
        for m in membership.iter_mut() {
            *m = partition[*m];
        }
        graph = graph.aggregate(&partition);
        level += 1;
        debug!(level, communities = graph.len(), "Louvain level aggregated.");
    }
    labels::compact(&membership)
}
