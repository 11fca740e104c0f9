use super::clustering;
use super::error::AlgorithmError;
use super::laplacian::{self, LaplacianKind};
use crate::core::models::network::ContactNetwork;
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, instrument};

/// How the spectral embedding is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partitioner {
    /// Hard clustering (k-means).
    Hard,
    /// Soft clustering (fuzzy c-means); may realize fewer than `k` clusters.
    Soft,
}

fn check_k(network: &ContactNetwork, k: usize) -> Result<(), AlgorithmError> {
    if k < 2 || k > network.len() {
        return Err(AlgorithmError::InvalidParameter(format!(
            "k = {} must satisfy 2 <= k <= {} (number of residues)",
            k,
            network.len()
        )));
    }
    Ok(())
}

/// The `n × k` spectral embedding of the network.
///
/// Rows are L2-normalized for the normalized Laplacian; a zero row stays zero.
pub fn embed(
    network: &ContactNetwork,
    kind: LaplacianKind,
    k: usize,
) -> Result<DMatrix<f64>, AlgorithmError> {
    check_k(network, k)?;
    let mut embedding = laplacian::spectrum(network, kind)?.smallest(k);
    if kind == LaplacianKind::Normalized {
        for mut row in embedding.row_iter_mut() {
            let norm = row.norm();
            if norm > 0.0 {
                row.unscale_mut(norm);
            }
        }
    }
    Ok(embedding)
}

fn partition(
    embedding: &DMatrix<f64>,
    k: usize,
    partitioner: Partitioner,
    seed: u64,
) -> Result<Vec<usize>, AlgorithmError> {
    let mut rng = StdRng::seed_from_u64(seed);
    match partitioner {
        Partitioner::Hard => clustering::kmeans(embedding, k, &mut rng),
        Partitioner::Soft => clustering::fuzzy_cmeans(embedding, k, &mut rng),
    }
}

/// Spectral clustering of the network into (at most) `k` clusters.
#[instrument(skip_all, name = "spectral_clustering", fields(kind = ?kind, k))]
pub fn spectral_clustering(
    network: &ContactNetwork,
    kind: LaplacianKind,
    partitioner: Partitioner,
    k: usize,
    seed: u64,
) -> Result<Vec<usize>, AlgorithmError> {
    let embedding = embed(network, kind, k)?;
    let labels = partition(&embedding, k, partitioner, seed)?;
    debug!(clusters = super::labels::cluster_count(&labels), "Spectral clustering finished.");
    Ok(labels)
}

/// The embedding used by scikit-learn's spectral clustering: eigenvectors of `L_sym`
/// scaled back by `D^{-1/2}`, clustered with k-means.
pub fn degree_scaled_clustering(
    network: &ContactNetwork,
    k: usize,
    seed: u64,
) -> Result<Vec<usize>, AlgorithmError> {
    check_k(network, k)?;
    let mut embedding = laplacian::spectrum(network, LaplacianKind::Normalized)?.smallest(k);
    let scale = laplacian::inverse_sqrt_degrees(network);
    for (i, mut row) in embedding.row_iter_mut().enumerate() {
        row.scale_mut(scale[i]);
    }
    partition(&embedding, k, Partitioner::Hard, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::labels::cluster_count;
    use crate::core::models::residue::Residue;

    /// Two 4-cliques joined by a single bridge (3-4).
    fn barbell() -> ContactNetwork {
        let n = 8;
        let residues = (0..n)
            .map(|i| Residue::new(i as isize + 1, None, "ALA", Some('A')))
            .collect();
        let mut m = DMatrix::zeros(n, n);
        for block in [0..4, 4..8] {
            for i in block.clone() {
                for j in block.clone() {
                    if i != j {
                        m[(i, j)] = 1.0;
                    }
                }
            }
        }
        m[(3, 4)] = 1.0;
        m[(4, 3)] = 1.0;
        ContactNetwork::new(residues, m).unwrap()
    }

    #[test]
    fn every_variant_splits_the_barbell() {
        let net = barbell();
        let expected = vec![0, 0, 0, 0, 1, 1, 1, 1];
        for kind in [
            LaplacianKind::Unnormalized,
            LaplacianKind::Normalized,
            LaplacianKind::Generalized,
        ] {
            for partitioner in [Partitioner::Hard, Partitioner::Soft] {
                let labels = spectral_clustering(&net, kind, partitioner, 2, 42).unwrap();
                assert_eq!(labels, expected, "{kind:?} / {partitioner:?}");
            }
        }
        assert_eq!(degree_scaled_clustering(&net, 2, 42).unwrap(), expected);
    }

    #[test]
    fn k_outside_range_is_rejected() {
        let net = barbell();
        for k in [0, 1, 9] {
            assert!(matches!(
                spectral_clustering(&net, LaplacianKind::Unnormalized, Partitioner::Hard, k, 1),
                Err(AlgorithmError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn labels_are_compacted() {
        let labels =
            spectral_clustering(&barbell(), LaplacianKind::Normalized, Partitioner::Hard, 3, 7)
                .unwrap();
        assert_eq!(cluster_count(&labels), 3);
        assert_eq!(labels[0], 0);
    }
}
