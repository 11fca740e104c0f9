use super::error::AlgorithmError;
use crate::core::models::network::ContactNetwork;
use std::collections::VecDeque;

const EIGENVECTOR_MAX_ITER: usize = 1000;
const EIGENVECTOR_TOLERANCE: f64 = 1e-6;

/// Hop distances from `source`; unreachable nodes are `None`.
fn bfs_distances(network: &ContactNetwork, source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; network.len()];
    dist[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        let next = dist[v].map_or(0, |d| d + 1);
        for &(w, _) in network.neighbors(v) {
            if dist[w].is_none() {
                dist[w] = Some(next);
                queue.push_back(w);
            }
        }
    }
    dist
}

/// Closeness with the Wasserman–Faust correction for disconnected networks:
/// `(r / Σd) · (r / (n − 1))` where `r` is the number of nodes reachable from `v`.
pub fn closeness(network: &ContactNetwork) -> Vec<f64> {
    let n = network.len();
    (0..n)
        .map(|v| {
            let (reachable, total) = bfs_distances(network, v)
                .into_iter()
                .flatten()
                .filter(|&d| d > 0)
                .fold((0usize, 0usize), |(r, t), d| (r + 1, t + d));
            if total == 0 || n < 2 {
                return 0.0;
            }
            let r = reachable as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        })
        .collect()
}

/// Brandes' shortest-path betweenness, normalized by `1/((n−1)(n−2))`.
pub fn betweenness(network: &ContactNetwork) -> Vec<f64> {
    let n = network.len();
    let mut centrality = vec![0.0; n];
    if n < 3 {
        return centrality;
    }

    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::new();

    for s in 0..n {
        stack.clear();
        predecessors.iter_mut().for_each(Vec::clear);
        sigma.fill(0.0);
        dist.fill(-1);
        delta.fill(0.0);

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &(w, _) in network.neighbors(v) {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    centrality.iter_mut().for_each(|c| *c *= scale);
    centrality
}

/// Eigenvector centrality by power iteration on `A + I`, L2-normalized.
pub fn eigenvector(network: &ContactNetwork) -> Result<Vec<f64>, AlgorithmError> {
    let n = network.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut x = vec![1.0 / n as f64; n];
    let tolerance = n as f64 * EIGENVECTOR_TOLERANCE;

    for _ in 0..EIGENVECTOR_MAX_ITER {
        let mut next = x.clone();
        for (v, value) in next.iter_mut().enumerate() {
            *value += network.neighbors(v).iter().map(|&(u, w)| w * x[u]).sum::<f64>();
        }
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(AlgorithmError::Numerical(
                "eigenvector iteration collapsed to zero".into(),
            ));
        }
        next.iter_mut().for_each(|v| *v /= norm);
        let change: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if change < tolerance {
            return Ok(x);
        }
    }
    Err(AlgorithmError::Numerical(format!(
        "eigenvector centrality did not converge in {} iterations",
        EIGENVECTOR_MAX_ITER
    )))
}

/// Degree divided by `n − 1`.
pub fn degree(network: &ContactNetwork) -> Vec<f64> {
    let n = network.len();
    let scale = if n > 1 { 1.0 / (n - 1) as f64 } else { 1.0 };
    (0..n).map(|v| network.degree(v) as f64 * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::Residue;
    use nalgebra::DMatrix;

    fn network(edges: &[(usize, usize)], n: usize) -> ContactNetwork {
        let residues = (0..n)
            .map(|i| Residue::new(i as isize + 1, None, "ALA", Some('A')))
            .collect();
        let mut m = DMatrix::zeros(n, n);
        for &(i, j) in edges {
            m[(i, j)] = 1.0;
            m[(j, i)] = 1.0;
        }
        ContactNetwork::new(residues, m).unwrap()
    }

    fn star() -> ContactNetwork {
        network(&[(0, 1), (0, 2), (0, 3), (0, 4)], 5)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn degree_centrality_of_a_star() {
        let d = degree(&star());
        assert!(close(d[0], 1.0));
        assert!(close(d[1], 0.25));
    }

    #[test]
    fn betweenness_of_a_star_center_is_one() {
        let b = betweenness(&star());
        assert!(close(b[0], 1.0));
        assert!(b[1..].iter().all(|&v| close(v, 0.0)));
    }

    #[test]
    fn betweenness_of_a_path() {
        let b = betweenness(&network(&[(0, 1), (1, 2)], 3));
        assert!(close(b[1], 1.0));
        assert!(close(b[0], 0.0));
    }

    #[test]
    fn closeness_of_a_path() {
        let c = closeness(&network(&[(0, 1), (1, 2)], 3));
        assert!(close(c[1], 1.0));
        assert!(close(c[0], 2.0 / 3.0));
    }

    #[test]
    fn closeness_scales_for_disconnected_networks() {
        let c = closeness(&network(&[(0, 1)], 4));
        // One reachable node at distance 1 out of n - 1 = 3.
        assert!(close(c[0], 1.0 / 3.0));
        assert_eq!(c[2], 0.0);
    }

    #[test]
    fn eigenvector_centrality_peaks_at_the_hub() {
        let e = eigenvector(&star()).unwrap();
        let norm: f64 = e.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!(close(norm, 1.0));
        assert!(e[1..].iter().all(|&v| v < e[0]));
        assert!(close(e[1], e[4]));
    }
}
