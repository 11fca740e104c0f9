use super::error::AlgorithmError;
use super::laplacian::{self, LaplacianKind};
use crate::core::models::network::ContactNetwork;
use tracing::{debug, instrument};

/// Gaps closer than this (relative to the larger one) count as ties.
const TIE_TOLERANCE: f64 = 1e-12;

/// Smallest network the eigengap heuristic accepts (three non-trivial eigenvalues).
pub const MIN_NODES: usize = 4;

/// Ranks candidate cluster counts by eigengap.
///
/// Eigenvalues are sorted ascending; the gap between positions `i` and `i + 1` proposes
/// `k = i + 1`. `k = 1` is never proposed. Up to `n_best` candidates are returned by
/// descending gap, ties going to the smaller `k`.
pub fn rank_by_eigengap(eigenvalues: &[f64], n_best: usize) -> Result<Vec<usize>, AlgorithmError> {
    if eigenvalues.len() < MIN_NODES {
        return Err(AlgorithmError::Spectral(format!(
            "eigengap analysis needs at least {} eigenvalues (got {})",
            MIN_NODES,
            eigenvalues.len()
        )));
    }
    if eigenvalues.iter().any(|v| !v.is_finite()) {
        return Err(AlgorithmError::Spectral("non-finite eigenvalue".into()));
    }
    let mut sorted = eigenvalues.to_vec();
    sorted.sort_by(f64::total_cmp);

    // (k, gap) for k = 2..n-1
    let mut candidates: Vec<(usize, f64)> = sorted
        .windows(2)
        .enumerate()
        .skip(1)
        .map(|(i, w)| (i + 1, (w[1] - w[0]).abs()))
        .collect();

    let mut ranked = Vec::with_capacity(n_best.min(candidates.len()));
    while ranked.len() < n_best && !candidates.is_empty() {
        let mut best = 0;
        for (idx, &(_, gap)) in candidates.iter().enumerate().skip(1) {
            let current = candidates[best].1;
            if gap - current > TIE_TOLERANCE * gap.max(current) {
                best = idx;
            }
        }
        ranked.push(candidates.remove(best).0);
    }
    Ok(ranked)
}

/// The top `n_best` cluster counts for `network` under the given Laplacian.
#[instrument(skip_all, name = "best_k", fields(kind = ?kind, n_best))]
pub fn best_ks(
    network: &ContactNetwork,
    kind: LaplacianKind,
    n_best: usize,
) -> Result<Vec<usize>, AlgorithmError> {
    if network.len() < MIN_NODES {
        return Err(AlgorithmError::Spectral(format!(
            "network has {} residues; eigengap analysis needs at least {}",
            network.len(),
            MIN_NODES
        )));
    }
    let spectrum = laplacian::spectrum(network, kind)?;
    let ks = rank_by_eigengap(&spectrum.values, n_best.max(1))?;
    debug!(?ks, "Eigengap candidates ranked.");
    Ok(ks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::Residue;
    use nalgebra::DMatrix;

    #[test]
    fn largest_gap_wins() {
        assert_eq!(rank_by_eigengap(&[0.0, 0.0, 0.0, 5.0, 5.1], 1).unwrap(), vec![3]);
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        assert_eq!(rank_by_eigengap(&[5.0, 0.0, 5.1, 0.0, 0.0], 1).unwrap(), vec![3]);
    }

    #[test]
    fn ties_prefer_the_smaller_k() {
        // Gaps: k=2 -> 1, k=3 -> 1, k=4 -> 1.
        assert_eq!(rank_by_eigengap(&[0.0, 0.0, 1.0, 2.0, 3.0], 2).unwrap(), vec![2, 3]);
    }

    #[test]
    fn k_of_one_is_never_proposed() {
        let ks = rank_by_eigengap(&[0.0, 10.0, 10.1, 10.2], 5).unwrap();
        assert!(!ks.contains(&1));
        assert_eq!(ks.len(), 2);
    }

    #[test]
    fn fewer_than_four_eigenvalues_is_degenerate() {
        assert!(matches!(
            rank_by_eigengap(&[0.0, 1.0, 2.0], 1),
            Err(AlgorithmError::Spectral(_))
        ));
    }

    #[test]
    fn three_separated_blocks_give_three() {
        let n = 12;
        let residues = (0..n)
            .map(|i| Residue::new(i as isize + 1, None, "ALA", Some('A')))
            .collect();
        let mut m = DMatrix::zeros(n, n);
        for b in 0..3 {
            for i in 4 * b..4 * b + 4 {
                for j in 4 * b..4 * b + 4 {
                    if i != j {
                        m[(i, j)] = 1.0;
                    }
                }
            }
        }
        let network = ContactNetwork::new(residues, m).unwrap();
        for kind in [
            LaplacianKind::Unnormalized,
            LaplacianKind::Normalized,
            LaplacianKind::Generalized,
        ] {
            assert_eq!(best_ks(&network, kind, 1).unwrap()[0], 3, "{kind:?}");
        }
    }
}
