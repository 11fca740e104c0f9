use crate::core::models::network::Representative;
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry;
use nalgebra::Point3;

/// Resolves the position standing in for `residue`, or `None` if the residue lacks the
/// atoms the representative needs.
pub fn representative_position(
    structure: &Structure,
    residue: &Residue,
    representative: Representative,
) -> Option<Point3<f64>> {
    match representative {
        Representative::AlphaCarbon => structure.residue_atom(residue, "CA").map(|a| a.position),
        Representative::BetaCarbon => {
            let name = if residue.is_glycine() { "CA" } else { "CB" };
            structure.residue_atom(residue, name).map(|a| a.position)
        }
        Representative::Centroid => geometry::centroid(
            structure
                .residue_atoms(residue)
                .filter(|a| !a.is_hydrogen())
                .map(|a| &a.position),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    fn structure_with(residue_name: &str, atoms: &[(&str, &str, [f64; 3])]) -> Structure {
        let mut structure = Structure::new();
        let r = structure.add_residue(Some('A'), 1, None, residue_name);
        for (i, (name, element, p)) in atoms.iter().enumerate() {
            let atom = Atom::new(i + 1, name, element, Point3::new(p[0], p[1], p[2]));
            structure.add_atom_to_residue(r, atom);
        }
        structure
    }

    #[test]
    fn alpha_carbon_uses_ca() {
        let s = structure_with("ALA", &[("N", "N", [0.0; 3]), ("CA", "C", [1.0, 2.0, 3.0])]);
        let p = representative_position(&s, &s.residues()[0], Representative::AlphaCarbon);
        assert_eq!(p, Some(Point3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn beta_carbon_falls_back_to_ca_for_glycine_only() {
        let gly = structure_with("GLY", &[("CA", "C", [1.0, 0.0, 0.0])]);
        let ala = structure_with("ALA", &[("CA", "C", [1.0, 0.0, 0.0])]);
        assert_eq!(
            representative_position(&gly, &gly.residues()[0], Representative::BetaCarbon),
            Some(Point3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(
            representative_position(&ala, &ala.residues()[0], Representative::BetaCarbon),
            None
        );
    }

    #[test]
    fn centroid_ignores_hydrogens() {
        let s = structure_with(
            "SER",
            &[
                ("CA", "C", [0.0, 0.0, 0.0]),
                ("CB", "C", [2.0, 0.0, 0.0]),
                ("HB1", "H", [100.0, 100.0, 100.0]),
            ],
        );
        let p = representative_position(&s, &s.residues()[0], Representative::Centroid);
        assert_eq!(p, Some(Point3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn residue_without_heavy_atoms_has_no_centroid() {
        let s = structure_with("SER", &[("H", "H", [0.0; 3])]);
        assert!(representative_position(&s, &s.residues()[0], Representative::Centroid).is_none());
    }
}
