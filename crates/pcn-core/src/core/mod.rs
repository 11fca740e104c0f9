//! # Core Module
//!
//! The stateless foundation of the library: molecular data models, file I/O and the
//! construction of contact networks from atomic coordinates.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, parsed structures and the
//!   immutable [`ContactNetwork`](models::network::ContactNetwork)
//! - **File I/O** ([`io`]) - PDB reading, adjacency matrix files and result mapping files
//! - **Contact Construction** ([`contacts`]) - Representative-atom selection and the
//!   two-sided distance-threshold contact builder
//! - **Utilities** ([`utils`]) - Geometry helpers shared by the builders
//!
//! Nothing in this module performs analysis; it only produces the data every algorithm in
//! [`crate::algorithms`] consumes.

pub mod contacts;
pub mod io;
pub mod models;
pub mod utils;
