use crate::algorithms::labels;
use crate::core::models::network::ContactNetwork;
use std::collections::{BTreeMap, BTreeSet};

/// Length of the random walks defining node distances.
pub const WALK_LENGTH: usize = 4;

const MODULARITY_EPSILON: f64 = 1e-12;

struct Community {
    probabilities: Vec<f64>,
    size: usize,
    internal: f64,
    total: f64,
}

#[derive(Clone, Copy)]
struct Pair {
    delta_sigma: f64,
    weight: f64,
}

/// Random-walk transition row of each node, with a self-loop of the node's mean
/// incident weight (unit weight when isolated).
fn walk_distribution(
    network: &ContactNetwork,
    start: usize,
    walk_degree: &[f64],
    loops: &[f64],
) -> Vec<f64> {
    let n = network.len();
    let mut current = vec![0.0; n];
    current[start] = 1.0;
    for _ in 0..WALK_LENGTH {
        let mut next = vec![0.0; n];
        for (k, &p) in current.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            let scale = p / walk_degree[k];
            next[k] += loops[k] * scale;
            for &(j, w) in network.neighbors(k) {
                next[j] += w * scale;
            }
        }
        current = next;
    }
    current
}

fn delta_sigma(a: &Community, b: &Community, walk_degree: &[f64], n: usize) -> f64 {
    let distance: f64 = a
        .probabilities
        .iter()
        .zip(&b.probabilities)
        .zip(walk_degree)
        .map(|((pa, pb), d)| (pa - pb).powi(2) / d)
        .sum();
    let (sa, sb) = (a.size as f64, b.size as f64);
    sa * sb / (sa + sb) * distance / n as f64
}

/// Walktrap (Pons & Latapy): agglomerates adjacent communities by minimum increase of
/// random-walk variance, then cuts the dendrogram at maximum modularity.
pub fn walktrap(network: &ContactNetwork) -> Vec<usize> {
    let n = network.len();
    let m = network.total_weight();
    if n == 0 || m == 0.0 {
        return (0..n).collect();
    }

    let loops: Vec<f64> = (0..n)
        .map(|i| match network.degree(i) {
            0 => 1.0,
            d => network.strength(i) / d as f64,
        })
        .collect();
    let walk_degree: Vec<f64> = (0..n).map(|i| network.strength(i) + loops[i]).collect();

    let mut communities: Vec<Option<Community>> = (0..n)
        .map(|i| {
            Some(Community {
                probabilities: walk_distribution(network, i, &walk_degree, &loops),
                size: 1,
                internal: 0.0,
                total: network.strength(i),
            })
        })
        .collect();
    let mut adjacent: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    let mut pairs: BTreeMap<(usize, usize), Pair> = BTreeMap::new();
    for i in 0..n {
        for &(j, w) in network.neighbors(i) {
            if j > i {
                adjacent[i].insert(j);
                adjacent[j].insert(i);
                if let (Some(a), Some(b)) = (&communities[i], &communities[j]) {
                    let ds = delta_sigma(a, b, &walk_degree, n);
                    pairs.insert((i, j), Pair { delta_sigma: ds, weight: w });
                }
            }
        }
    }

    let mut modularity: f64 = communities
        .iter()
        .flatten()
        .map(|c| -(c.total / (2.0 * m)).powi(2))
        .sum();
    let mut best_modularity = modularity;
    let mut best_step = 0;
    let mut merges: Vec<(usize, usize)> = Vec::new();

    loop {
        let Some((a, b, pair)) = pairs
            .iter()
            .min_by(|x, y| x.1.delta_sigma.total_cmp(&y.1.delta_sigma))
            .map(|(&(a, b), &pair)| (a, b, pair))
        else {
            break;
        };
        let (Some(ca), Some(cb)) = (communities[a].take(), communities[b].take()) else {
            break;
        };
        let size = ca.size + cb.size;
        let probabilities = ca
            .probabilities
            .iter()
            .zip(&cb.probabilities)
            .map(|(pa, pb)| (ca.size as f64 * pa + cb.size as f64 * pb) / size as f64)
            .collect();
        let internal = ca.internal + cb.internal + pair.weight;
        let total = ca.total + cb.total;
        modularity += (internal - ca.internal - cb.internal) / m
            - (total.powi(2) - ca.total.powi(2) - cb.total.powi(2)) / (4.0 * m * m);
        communities[a] = Some(Community {
            probabilities,
            size,
            internal,
            total,
        });

        // Rewire b's adjacencies onto a.
        pairs.remove(&(a, b));
        let b_neighbors: Vec<usize> = adjacent[b].iter().copied().filter(|&c| c != a).collect();
        adjacent[a].remove(&b);
        adjacent[b].clear();
        let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
        for &c in adjacent[a].iter() {
            let key = (a.min(c), a.max(c));
            if let Some(p) = pairs.get(&key) {
                *weights.entry(c).or_default() += p.weight;
            }
        }
        for c in b_neighbors {
            let key = (b.min(c), b.max(c));
            if let Some(p) = pairs.remove(&key) {
                *weights.entry(c).or_default() += p.weight;
            }
            adjacent[c].remove(&b);
            adjacent[c].insert(a);
            adjacent[a].insert(c);
        }
        for (c, weight) in weights {
            if let (Some(ca), Some(cc)) = (&communities[a], &communities[c]) {
                let ds = delta_sigma(ca, cc, &walk_degree, n);
                pairs.insert((a.min(c), a.max(c)), Pair { delta_sigma: ds, weight });
            }
        }

        merges.push((a, b));
        if modularity > best_modularity + MODULARITY_EPSILON {
            best_modularity = modularity;
            best_step = merges.len();
        }
    }

    let mut groups: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    for &(a, b) in &merges[..best_step] {
        let moved = std::mem::take(&mut groups[b]);
        groups[a].extend(moved);
    }
    let mut assignment = vec![0; n];
    for (id, group) in groups.iter().enumerate() {
        for &v in group {
            assignment[v] = id;
        }
    }
    labels::compact(&assignment)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn finds_disconnected_components() {
        assert_eq!(walktrap(&two_cliques(4)), halves(4));
    }

    #[test]
    fn splits_a_barbell_at_the_bridge() {
        assert_eq!(walktrap(&barbell(5)), halves(5));
    }

    #[test]
    fn walk_distributions_are_probabilities() {
        let net = barbell(3);
        let loops = vec![1.0; 6];
        let degree: Vec<f64> = (0..6).map(|i| net.strength(i) + 1.0).collect();
        let p = walk_distribution(&net, 0, &degree, &loops);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_network_gives_singletons() {
        assert_eq!(walktrap(&network(&[], 3)), vec![0, 1, 2]);
    }
}
