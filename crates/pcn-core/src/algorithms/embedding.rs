//! Node embeddings: HOPE, Laplacian eigenmaps and node2vec.
//!
//! Each function returns an `n × d` matrix with one row per residue, ready for the
//! partitional clustering in [`super::clustering`].

use super::error::AlgorithmError;
use super::laplacian::{self, LaplacianKind};
use crate::core::models::network::ContactNetwork;
use nalgebra::{DMatrix, SVD};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

/// node2vec return parameter `p`.
pub const RETURN_PARAM: f64 = 1.0;
/// node2vec in-out parameter `q`.
pub const IN_OUT_PARAM: f64 = 1.0;
/// Skip-gram context window.
pub const WINDOW_SIZE: usize = 10;
/// Negative samples per positive pair, which shifts the PMI by `ln(NEGATIVE_SAMPLES)`.
pub const NEGATIVE_SAMPLES: f64 = 5.0;

/// Smallest-to-largest LU pivot ratio below which the Katz system counts as singular.
const SINGULARITY_RATIO: f64 = 1e-12;

fn check_dimension(network: &ContactNetwork, d: usize) -> Result<(), AlgorithmError> {
    if d == 0 || d >= network.len() {
        return Err(AlgorithmError::InvalidParameter(format!(
            "embedding dimension {} must satisfy 1 <= d < {} (number of residues)",
            d,
            network.len()
        )));
    }
    Ok(())
}

/// Singular triplet indices sorted by descending singular value.
fn descending_order(values: &nalgebra::DVector<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

/// High-Order Proximity preserved Embedding with Katz proximity.
///
/// `S = (I − βA)^{-1} βA` is factorized by SVD; the first `⌈d/2⌉` columns come from the
/// source vectors `U √Σ`, the rest from the target vectors `V √Σ`.
#[instrument(skip_all, name = "hope_embedding", fields(d, beta))]
pub fn hope(network: &ContactNetwork, d: usize, beta: f64) -> Result<DMatrix<f64>, AlgorithmError> {
    check_dimension(network, d)?;
    if !(beta.is_finite() && beta > 0.0) {
        return Err(AlgorithmError::InvalidParameter(format!(
            "decay factor beta must be positive (got {})",
            beta
        )));
    }
    let n = network.len();
    let scaled = network.adjacency() * beta;
    let system = DMatrix::identity(n, n) - &scaled;
    let singular =
        || AlgorithmError::Numerical(format!("I - beta*A is singular for beta = {}", beta));
    let lu = system.lu();
    let pivots = lu.u().diagonal().map(f64::abs);
    if pivots.min() <= SINGULARITY_RATIO * pivots.max() {
        return Err(singular());
    }
    let proximity = lu.solve(&scaled).ok_or_else(singular)?;

    let svd = SVD::new(proximity, true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(AlgorithmError::Numerical("SVD did not produce singular vectors".into())),
    };
    let order = descending_order(&svd.singular_values);

    let source_dims = d.div_ceil(2);
    let target_dims = d - source_dims;
    let mut embedding = DMatrix::zeros(n, d);
    for (col, &idx) in order.iter().take(source_dims).enumerate() {
        let s = svd.singular_values[idx].sqrt();
        embedding.set_column(col, &(u.column(idx) * s));
    }
    for (col, &idx) in order.iter().take(target_dims).enumerate() {
        let s = svd.singular_values[idx].sqrt();
        embedding.set_column(source_dims + col, &(v_t.row(idx).transpose() * s));
    }
    Ok(embedding)
}

/// Generalized Laplacian eigenvectors `2..=d+1` (the trivial first one is skipped).
#[instrument(skip_all, name = "laplacian_eigenmaps", fields(d))]
pub fn laplacian_eigenmaps(network: &ContactNetwork, d: usize) -> Result<DMatrix<f64>, AlgorithmError> {
    check_dimension(network, d)?;
    let spectrum = laplacian::spectrum(network, LaplacianKind::Generalized)?;
    Ok(spectrum.vectors.columns(1, d).into_owned())
}

/// Walk configuration for [`node2vec`].
#[derive(Debug, Clone, Copy)]
pub struct WalkParams {
    pub walk_length: usize,
    pub num_walks: usize,
    pub p: f64,
    pub q: f64,
}

/// Second-order biased random walks, `num_walks` rounds over all nodes in shuffled order.
pub fn biased_walks(
    network: &ContactNetwork,
    params: &WalkParams,
    rng: &mut StdRng,
) -> Vec<Vec<usize>> {
    let n = network.len();
    let mut walks = Vec::with_capacity(n * params.num_walks);
    let mut starts: Vec<usize> = (0..n).collect();

    for _ in 0..params.num_walks {
        starts.shuffle(rng);
        for &start in &starts {
            let mut walk = Vec::with_capacity(params.walk_length);
            walk.push(start);
            while walk.len() < params.walk_length {
                let current = walk[walk.len() - 1];
                let neighbors = network.neighbors(current);
                if neighbors.is_empty() {
                    break;
                }
                let previous = (walk.len() > 1).then(|| walk[walk.len() - 2]);
                let weights: Vec<f64> = neighbors
                    .iter()
                    .map(|&(next, w)| match previous {
                        None => w,
                        Some(prev) if next == prev => w / params.p,
                        Some(prev) if network.has_contact(prev, next) => w,
                        Some(_) => w / params.q,
                    })
                    .collect();
                let Ok(dist) = WeightedIndex::new(&weights) else {
                    break;
                };
                walk.push(neighbors[dist.sample(rng)].0);
            }
            walks.push(walk);
        }
    }
    walks
}

/// Shifted positive PMI of windowed co-occurrences.
fn shifted_ppmi(walks: &[Vec<usize>], n: usize) -> DMatrix<f64> {
    let mut counts = DMatrix::<f64>::zeros(n, n);
    for walk in walks {
        for (i, &center) in walk.iter().enumerate() {
            for &context in walk.iter().skip(i + 1).take(WINDOW_SIZE) {
                counts[(center, context)] += 1.0;
                counts[(context, center)] += 1.0;
            }
        }
    }
    let total = counts.sum();
    if total == 0.0 {
        return counts;
    }
    let marginals: Vec<f64> = counts.row_iter().map(|r| r.sum()).collect();
    let shift = NEGATIVE_SAMPLES.ln();
    DMatrix::from_fn(n, n, |i, j| {
        let c = counts[(i, j)];
        if c == 0.0 {
            return 0.0;
        }
        let pmi = (c * total / (marginals[i] * marginals[j])).ln() - shift;
        pmi.max(0.0)
    })
}

/// node2vec vectors as the rank-`d` factorization `U_d √Σ_d` of the shifted PPMI matrix
/// of biased-walk co-occurrences.
#[instrument(skip_all, name = "node2vec_embedding", fields(d, walk_length = params.walk_length, num_walks = params.num_walks))]
pub fn node2vec(
    network: &ContactNetwork,
    d: usize,
    params: &WalkParams,
    rng: &mut StdRng,
) -> Result<DMatrix<f64>, AlgorithmError> {
    check_dimension(network, d)?;
    if params.walk_length < 2 || params.num_walks == 0 {
        return Err(AlgorithmError::InvalidParameter(format!(
            "walk length ({}) must be at least 2 and walk count ({}) at least 1",
            params.walk_length, params.num_walks
        )));
    }
    if !(params.p > 0.0 && params.q > 0.0) {
        return Err(AlgorithmError::InvalidParameter("p and q must be positive".into()));
    }

    let walks = biased_walks(network, params, rng);
    debug!(walks = walks.len(), "Random walks generated.");
    let ppmi = shifted_ppmi(&walks, network.len());

    let svd = SVD::new(ppmi, true, false);
    let u = svd
        .u
        .ok_or_else(|| AlgorithmError::Numerical("SVD did not produce singular vectors".into()))?;
    let order = descending_order(&svd.singular_values);

    let mut embedding = DMatrix::zeros(network.len(), d);
    for (col, &idx) in order.iter().take(d).enumerate() {
        let s = svd.singular_values[idx].sqrt();
        embedding.set_column(col, &(u.column(idx) * s));
    }
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::Residue;
    use rand::SeedableRng;

    fn cycle(n: usize) -> ContactNetwork {
        let residues = (0..n)
            .map(|i| Residue::new(i as isize + 1, None, "ALA", Some('A')))
            .collect();
        let mut m = DMatrix::zeros(n, n);
        for i in 0..n {
            let j = (i + 1) % n;
            m[(i, j)] = 1.0;
            m[(j, i)] = 1.0;
        }
        ContactNetwork::new(residues, m).unwrap()
    }

    #[test]
    fn hope_returns_requested_shape() {
        let embedding = hope(&cycle(6), 3, 0.01).unwrap();
        assert_eq!(embedding.shape(), (6, 3));
        assert!(embedding.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn hope_reports_singular_katz_system() {
        // beta = 1/2 makes I - beta*A singular for a cycle (largest eigenvalue 2).
        let err = hope(&cycle(6), 2, 0.5).unwrap_err();
        assert!(matches!(err, AlgorithmError::Numerical(_)));
    }

    #[test]
    fn eigenmaps_reject_dimension_too_large() {
        assert!(matches!(
            laplacian_eigenmaps(&cycle(4), 4),
            Err(AlgorithmError::InvalidParameter(_))
        ));
        assert_eq!(laplacian_eigenmaps(&cycle(4), 2).unwrap().shape(), (4, 2));
    }

    #[test]
    fn walks_follow_contacts() {
        let net = cycle(5);
        let params = WalkParams {
            walk_length: 8,
            num_walks: 2,
            p: 1.0,
            q: 1.0,
        };
        let walks = biased_walks(&net, &params, &mut StdRng::seed_from_u64(1));
        assert_eq!(walks.len(), 10);
        for walk in &walks {
            assert_eq!(walk.len(), 8);
            for pair in walk.windows(2) {
                assert!(net.has_contact(pair[0], pair[1]));
            }
        }
    }

    #[test]
    fn node2vec_is_deterministic_for_a_seed() {
        let net = cycle(8);
        let params = WalkParams {
            walk_length: 10,
            num_walks: 5,
            p: RETURN_PARAM,
            q: IN_OUT_PARAM,
        };
        let a = node2vec(&net, 2, &params, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = node2vec(&net, 2, &params, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.shape(), (8, 2));
    }
}
