//! # Core Models Module
//!
//! Data structures describing a protein structure and the contact network derived from it.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atoms with coordinates and element information
//! - [`residue`] - Residues, their identifiers and amino-acid codes
//! - [`structure`] - An ordered collection of residues and their atoms, as parsed from file
//! - [`network`] - The symmetric contact matrix over a filtered residue list, together with
//!   the parameters (representative atom, threshold band) it was built from
//!
//! ```ignore
//! use pcnminer::core::models::structure::Structure;
//! use pcnminer::core::models::atom::Atom;
//!
//! let mut structure = Structure::new();
//! let residue = structure.add_residue(Some('A'), 1, None, "ALA");
//! structure.add_atom_to_residue(residue, Atom::new(1, "CA", "C", Point3::new(0.0, 0.0, 0.0)));
//! ```

pub mod atom;
pub mod network;
pub mod residue;
pub mod structure;
