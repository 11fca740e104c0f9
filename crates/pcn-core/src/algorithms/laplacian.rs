use super::error::AlgorithmError;
use crate::core::models::network::ContactNetwork;
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Which Laplacian an analysis is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaplacianKind {
    /// `L = D − A`.
    Unnormalized,
    /// `L_sym = I − D^{-1/2} A D^{-1/2}`.
    Normalized,
    /// The generalized problem `L v = λ D v` (Shi–Malik).
    Generalized,
}

/// Eigenvalues in ascending order, with eigenvectors as the matching columns.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub values: Vec<f64>,
    pub vectors: DMatrix<f64>,
}

impl Spectrum {
    /// The eigenvectors of the `count` smallest eigenvalues, as an `n × count` matrix.
    pub fn smallest(&self, count: usize) -> DMatrix<f64> {
        self.vectors.columns(0, count).into_owned()
    }
}

/// Weighted degree (strength) of every node.
pub fn degrees(network: &ContactNetwork) -> DVector<f64> {
    DVector::from_iterator(network.len(), (0..network.len()).map(|i| network.strength(i)))
}

/// `d^{-1/2}` per node; isolated nodes use a unit degree.
pub fn inverse_sqrt_degrees(network: &ContactNetwork) -> DVector<f64> {
    degrees(network).map(|d| if d > 0.0 { 1.0 / d.sqrt() } else { 1.0 })
}

pub fn unnormalized(network: &ContactNetwork) -> DMatrix<f64> {
    let mut laplacian = -network.adjacency().clone();
    for (i, d) in degrees(network).iter().enumerate() {
        laplacian[(i, i)] = *d;
    }
    laplacian
}

pub fn normalized(network: &ContactNetwork) -> DMatrix<f64> {
    let scale = inverse_sqrt_degrees(network);
    let n = network.len();
    DMatrix::from_fn(n, n, |i, j| {
        let a = -network.weight(i, j) * scale[i] * scale[j];
        if i == j { 1.0 + a } else { a }
    })
}

/// Full eigendecomposition of the requested Laplacian, sorted ascending.
///
/// The generalized problem shares its eigenvalues with `L_sym`; its eigenvectors are
/// recovered as `v = D^{-1/2} u`.
pub fn spectrum(network: &ContactNetwork, kind: LaplacianKind) -> Result<Spectrum, AlgorithmError> {
    let n = network.len();
    if n == 0 {
        return Err(AlgorithmError::Spectral("network has no nodes".into()));
    }
    let matrix = match kind {
        LaplacianKind::Unnormalized => unnormalized(network),
        LaplacianKind::Normalized | LaplacianKind::Generalized => normalized(network),
    };

    let max_iterations = (30 * n).max(10_000);
    let eigen = SymmetricEigen::try_new(matrix, f64::EPSILON, max_iterations).ok_or_else(|| {
        AlgorithmError::Spectral(format!(
            "eigendecomposition did not converge within {} iterations",
            max_iterations
        ))
    })?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let values = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let mut vectors = DMatrix::from_fn(n, n, |row, col| eigen.eigenvectors[(row, order[col])]);

    if kind == LaplacianKind::Generalized {
        let scale = inverse_sqrt_degrees(network);
        for (row, s) in scale.iter().enumerate() {
            vectors.row_mut(row).scale_mut(*s);
        }
    }

    Ok(Spectrum { values, vectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::Residue;

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

    #[test]
    fn unnormalized_rows_sum_to_zero() {
        let net = network(&[(0, 1), (1, 2), (2, 0), (2, 3)], 4);
        let l = unnormalized(&net);
        for i in 0..4 {
            assert!(l.row(i).sum().abs() < 1e-12);
        }
        assert_eq!(l[(2, 2)], 3.0);
    }

    #[test]
    fn normalized_laplacian_has_unit_diagonal_for_isolated_nodes() {
        let net = network(&[(0, 1)], 3);
        let l = normalized(&net);
        assert_eq!(l[(2, 2)], 1.0);
        assert!((l[(0, 1)] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn spectrum_is_sorted_and_counts_components() {
        let net = network(&[(0, 1), (1, 2), (3, 4)], 5);
        let spectrum = spectrum(&net, LaplacianKind::Unnormalized).unwrap();
        assert!(spectrum.values.windows(2).all(|w| w[0] <= w[1]));
        let zeros = spectrum.values.iter().filter(|v| v.abs() < 1e-9).count();
        assert_eq!(zeros, 2);
    }

    #[test]
    fn generalized_vectors_solve_the_generalized_problem() {
        let net = network(&[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)], 4);
        let spectrum = spectrum(&net, LaplacianKind::Generalized).unwrap();
        let l = unnormalized(&net);
        let d = DMatrix::from_diagonal(&degrees(&net));
        for (col, &value) in spectrum.values.iter().enumerate() {
            let v = spectrum.vectors.column(col);
            let residual = &l * v - (&d * v) * value;
            assert!(residual.norm() < 1e-8);
        }
    }
}
