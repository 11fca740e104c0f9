//! Community detection.
//!
//! Every detector takes the contact network and returns a compacted label vector. The
//! multilevel methods ([`louvain`], [`leiden`], [`infomap`]) share [`AggregateGraph`],
//! which collapses a partition into a smaller weighted graph with self-loops.

pub mod fluid;
pub mod greedy;
pub mod infomap;
pub mod leiden;
pub mod louvain;
pub mod spinglass;
pub mod walktrap;

use super::error::AlgorithmError;
use crate::core::models::network::ContactNetwork;
use std::collections::BTreeMap;

/// Gains below this are treated as zero.
pub(crate) const GAIN_EPSILON: f64 = 1e-12;

/// A weighted undirected graph whose nodes may stand for groups of residues.
#[derive(Debug, Clone)]
pub struct AggregateGraph {
    /// Neighbors without self-loops, ascending by index.
    pub neighbors: Vec<Vec<(usize, f64)>>,
    /// Total weight of the edges collapsed into each node.
    pub self_weight: Vec<f64>,
    /// `Σ neighbor weights + 2 · self weight`.
    pub strength: Vec<f64>,
    /// Sum of all strengths (twice the total edge weight).
    pub total_strength: f64,
}

impl AggregateGraph {
    pub fn from_network(network: &ContactNetwork) -> Self {
        let neighbors: Vec<Vec<(usize, f64)>> =
            (0..network.len()).map(|i| network.neighbors(i).to_vec()).collect();
        Self::from_parts(neighbors, vec![0.0; network.len()])
    }

    fn from_parts(neighbors: Vec<Vec<(usize, f64)>>, self_weight: Vec<f64>) -> Self {
        let strength: Vec<f64> = neighbors
            .iter()
            .zip(&self_weight)
            .map(|(nbrs, s)| nbrs.iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * s)
            .collect();
        let total_strength = strength.iter().sum();
        Self {
            neighbors,
            self_weight,
            strength,
            total_strength,
        }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Collapses every community of `partition` (labels `0..c`) into one node.
    pub fn aggregate(&self, partition: &[usize]) -> Self {
        let count = partition.iter().max().map_or(0, |&m| m + 1);
        let mut self_weight = vec![0.0; count];
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];

        for (u, nbrs) in self.neighbors.iter().enumerate() {
            let cu = partition[u];
            self_weight[cu] += self.self_weight[u];
            for &(v, w) in nbrs {
                if v <= u {
                    continue;
                }
                let cv = partition[v];
                if cu == cv {
                    self_weight[cu] += w;
                } else {
                    *links[cu].entry(cv).or_default() += w;
                    *links[cv].entry(cu).or_default() += w;
                }
            }
        }

        let neighbors = links.into_iter().map(|m| m.into_iter().collect()).collect();
        Self::from_parts(neighbors, self_weight)
    }

    /// Weight from `node` to each community of `partition` (self-loops excluded), in
    /// order of first encounter.
    pub(crate) fn community_links(&self, node: usize, partition: &[usize]) -> Vec<(usize, f64)> {
        let mut links: Vec<(usize, f64)> = Vec::new();
        for &(v, w) in &self.neighbors[node] {
            let c = partition[v];
            match links.iter_mut().find(|(id, _)| *id == c) {
                Some(entry) => entry.1 += w,
                None => links.push((c, w)),
            }
        }
        links
    }
}

/// Newman–Girvan modularity of `labels` on the network.
pub fn modularity(network: &ContactNetwork, labels: &[usize]) -> f64 {
    let m = network.total_weight();
    if m == 0.0 {
        return 0.0;
    }
    let count = labels.iter().max().map_or(0, |&c| c + 1);
    let mut internal = vec![0.0; count];
    let mut total = vec![0.0; count];
    for i in 0..network.len() {
        total[labels[i]] += network.strength(i);
        for &(j, w) in network.neighbors(i) {
            if j > i && labels[i] == labels[j] {
                internal[labels[i]] += w;
            }
        }
    }
    internal
        .iter()
        .zip(&total)
        .map(|(inside, tot)| inside / m - (tot / (2.0 * m)).powi(2))
        .sum()
}

pub(crate) fn require_connected(
    network: &ContactNetwork,
    algorithm: &'static str,
) -> Result<(), AlgorithmError> {
    if network.is_connected() {
        return Ok(());
    }
    let components = network.components().into_iter().max().map_or(0, |c| c + 1);
    Err(AlgorithmError::Disconnected {
        algorithm,
        components,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn aggregation_preserves_total_strength() {
        let net = barbell(4);
        let graph = AggregateGraph::from_network(&net);
        let collapsed = graph.aggregate(&halves(4));
        assert_eq!(collapsed.len(), 2);
        assert!((collapsed.total_strength - graph.total_strength).abs() < 1e-12);
        assert_eq!(collapsed.self_weight, vec![6.0, 6.0]);
        assert_eq!(collapsed.neighbors[0], vec![(1, 1.0)]);
    }

    #[test]
    fn modularity_of_separated_cliques() {
        let net = two_cliques(3);
        let q = modularity(&net, &halves(3));
        assert!((q - 0.5).abs() < 1e-12);
        assert!(modularity(&net, &[0; 6]).abs() < 1e-12);
    }

    #[test]
    fn disconnected_networks_are_reported() {
        let err = require_connected(&two_cliques(3), "test").unwrap_err();
        assert_eq!(
            err,
            AlgorithmError::Disconnected {
                algorithm: "test",
                components: 2
            }
        );
    }
}
