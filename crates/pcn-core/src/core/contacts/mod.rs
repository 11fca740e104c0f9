//! Contact network construction: one representative position per residue, then a
//! pairwise distance test against a two-sided threshold band.

pub mod builder;
pub mod representative;
