use super::require_connected;
use crate::algorithms::error::AlgorithmError;
use crate::algorithms::labels;
use crate::core::models::network::ContactNetwork;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use tracing::debug;

pub const MAX_ITERATIONS: usize = 100;

const DENSITY_TOLERANCE: f64 = 1e-4;

/// Asynchronous fluid communities (Parés et al.).
///
/// `k` communities are seeded on random vertices; each sweep visits vertices in a fresh
/// random order and moves a vertex to the community with the highest summed density over
/// its closed neighborhood. Stops when a sweep changes nothing, or after
/// [`MAX_ITERATIONS`] sweeps once every vertex belongs to a community.
pub fn fluid_communities(
    network: &ContactNetwork,
    k: usize,
    seed: u64,
) -> Result<Vec<usize>, AlgorithmError> {
    require_connected(network, "asyn_fluidc")?;
    let n = network.len();
    if k == 0 || k > n {
        return Err(AlgorithmError::InvalidParameter(format!(
            "k = {} must satisfy 1 <= k <= {} (number of residues)",
            k, n
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut vertices: Vec<usize> = (0..n).collect();
    vertices.shuffle(&mut rng);

    let mut community: Vec<Option<usize>> = vec![None; n];
    let mut sizes = vec![0usize; k];
    for (c, &v) in vertices.iter().take(k).enumerate() {
        community[v] = Some(c);
        sizes[c] = 1;
    }
    let density = |sizes: &[usize], c: usize| 1.0 / sizes[c] as f64;

    let mut iteration = 0;
    loop {
        iteration += 1;
        let mut changed = false;
        vertices.shuffle(&mut rng);
        for &v in &vertices {
            let mut scores: BTreeMap<usize, f64> = BTreeMap::new();
            let closed = std::iter::once(v).chain(network.neighbors(v).iter().map(|&(u, _)| u));
            for u in closed {
                if let Some(c) = community[u] {
                    *scores.entry(c).or_default() += density(&sizes, c);
                }
            }
            let Some(max) = scores.values().copied().reduce(f64::max) else {
                continue;
            };
            let candidates: Vec<usize> = scores
                .iter()
                .filter(|&(_, &s)| max - s < DENSITY_TOLERANCE)
                .map(|(&c, _)| c)
                .collect();
            if community[v].is_some_and(|c| candidates.contains(&c)) {
                continue;
            }
            let Some(&chosen) = candidates.choose(&mut rng) else {
                continue;
            };
            if let Some(old) = community[v] {
                sizes[old] -= 1;
            }
            sizes[chosen] += 1;
            community[v] = Some(chosen);
            changed = true;
        }

        let all_assigned = community.iter().all(Option::is_some);
        if !changed || (iteration >= MAX_ITERATIONS && all_assigned) {
            break;
        }
    }
    debug!(iterations = iteration, "Fluid communities converged.");

    let assignment: Vec<usize> = community.into_iter().map(|c| c.unwrap_or(0)).collect();
    Ok(labels::compact(&assignment))
}
