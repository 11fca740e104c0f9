use super::representative::representative_position;
use crate::core::models::network::{
    ContactNetwork, EdgeWeighting, NetworkError, Representative, ThresholdBand,
};
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry;
use nalgebra::{DMatrix, Point3};
use thiserror::Error;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Structure has no residue with a resolvable {representative} representative")]
    NoResolvableResidues { representative: Representative },
    #[error("Built matrix is invalid: {0}")]
    Network(#[from] NetworkError),
}

/// Parameters of one contact matrix construction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactParams {
    pub representative: Representative,
    pub band: ThresholdBand,
    pub weighting: EdgeWeighting,
}

/// The residues that have a resolvable representative, with their positions.
///
/// Unresolvable residues are dropped here, once; every index used downstream refers to
/// the returned list.
pub fn resolve_residues(
    structure: &Structure,
    representative: Representative,
) -> (Vec<Residue>, Vec<Point3<f64>>) {
    structure
        .residues()
        .iter()
        .filter_map(|residue| {
            representative_position(structure, residue, representative)
                .map(|p| (residue.clone(), p))
        })
        .unzip()
}

/// Builds the contact network of `structure`.
///
/// A contact between residues `i ≠ j` exists iff `band.min ≤ d(i, j) ≤ band.max`. Every
/// unordered pair is measured once and written to both `(i, j)` and `(j, i)`.
#[instrument(skip_all, name = "build_contact_network", fields(representative = %params.representative))]
pub fn build_network(
    structure: &Structure,
    params: &ContactParams,
) -> Result<ContactNetwork, ContactError> {
    let (residues, positions) = resolve_residues(structure, params.representative);
    if residues.is_empty() {
        return Err(ContactError::NoResolvableResidues {
            representative: params.representative,
        });
    }
    let dropped = structure.len() - residues.len();
    if dropped > 0 {
        debug!(dropped, "Residues without a resolvable representative were dropped.");
    }

    let n = positions.len();
    let rows: Vec<usize> = (0..n).collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = rows.iter();

    #[cfg(feature = "parallel")]
    let iterator = rows.par_iter();

    let contacts: Vec<Vec<(usize, f64)>> = iterator
        .map(|&i| {
            ((i + 1)..n)
                .filter_map(|j| {
                    let d = geometry::distance(&positions[i], &positions[j]);
                    params.band.contains(d).then(|| (j, edge_weight(params.weighting, d)))
                })
                .collect()
        })
        .collect();

    let mut adjacency = DMatrix::zeros(n, n);
    for (i, row) in contacts.into_iter().enumerate() {
        for (j, w) in row {
            adjacency[(i, j)] = w;
            adjacency[(j, i)] = w;
        }
    }

    let network = ContactNetwork::new(residues, adjacency)?;
    debug!(
        nodes = network.len(),
        contacts = network.contact_count(),
        "Contact network built."
    );
    Ok(network)
}

#[inline]
fn edge_weight(weighting: EdgeWeighting, distance: f64) -> f64 {
    match weighting {
        EdgeWeighting::Binary => 1.0,
        // A zero distance only passes a band starting at zero; keep the contact finite.
        EdgeWeighting::InverseDistance if distance > 0.0 => 1.0 / distance,
        EdgeWeighting::InverseDistance => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    fn line_structure(xs: &[f64]) -> Structure {
        let mut structure = Structure::new();
        for (i, &x) in xs.iter().enumerate() {
            let r = structure.add_residue(Some('A'), i as isize + 1, None, "ALA");
            structure.add_atom_to_residue(r, Atom::new(i + 1, "CA", "C", Point3::new(x, 0.0, 0.0)));
        }
        structure
    }

    fn params(min: f64, max: f64) -> ContactParams {
        ContactParams {
            band: ThresholdBand::new(min, max).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn contacts_use_an_inclusive_band() {
        let structure = line_structure(&[0.0, 4.0, 12.0, 20.5]);
        let network = build_network(&structure, &params(4.0, 8.0)).unwrap();
        assert!(network.has_contact(0, 1));
        assert!(network.has_contact(1, 2));
        assert!(!network.has_contact(0, 2));
        assert!(!network.has_contact(2, 3));
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let structure = line_structure(&[0.0, 3.0, 5.0, 9.0, 10.0]);
        let network = build_network(&structure, &params(2.0, 6.0)).unwrap();
        let a = network.adjacency();
        for i in 0..a.nrows() {
            assert_eq!(a[(i, i)], 0.0);
            for j in 0..a.ncols() {
                assert_eq!(a[(i, j)], a[(j, i)]);
            }
        }
    }

    #[test]
    fn unresolvable_residues_are_dropped_without_shifting_identity() {
        let mut structure = line_structure(&[0.0, 5.0]);
        let r = structure.add_residue(Some('A'), 3, None, "HOH");
        structure.add_atom_to_residue(r, Atom::new(9, "O", "O", Point3::new(2.0, 0.0, 0.0)));
        let r = structure.add_residue(Some('A'), 4, None, "ALA");
        structure.add_atom_to_residue(r, Atom::new(10, "CA", "C", Point3::new(10.0, 0.0, 0.0)));

        let network = build_network(&structure, &params(4.0, 8.0)).unwrap();
        assert_eq!(network.residue_ids(), vec!["ALA1A", "ALA2A", "ALA4A"]);
        assert!(network.has_contact(1, 2));
    }

    #[test]
    fn inverse_distance_weights_contacts() {
        let structure = line_structure(&[0.0, 4.0]);
        let p = ContactParams {
            weighting: EdgeWeighting::InverseDistance,
            ..params(0.0, 8.0)
        };
        let network = build_network(&structure, &p).unwrap();
        assert!((network.weight(0, 1) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn structure_without_representatives_is_an_error() {
        let mut structure = Structure::new();
        let r = structure.add_residue(Some('A'), 1, None, "HOH");
        structure.add_atom_to_residue(r, Atom::new(1, "O", "O", Point3::origin()));
        let err = build_network(&structure, &params(4.0, 8.0)).unwrap_err();
        assert!(matches!(err, ContactError::NoResolvableResidues { .. }));
    }

    #[test]
    fn building_twice_gives_identical_matrices() {
        let structure = line_structure(&[0.0, 3.3, 7.1, 9.9, 14.2]);
        let a = build_network(&structure, &params(3.0, 8.0)).unwrap();
        let b = build_network(&structure, &params(3.0, 8.0)).unwrap();
        assert_eq!(a.adjacency(), b.adjacency());
    }
}
