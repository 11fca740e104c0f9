//! Reading and writing the files the engine consumes and produces.
//!
//! Structures come in as PDB text through the [`traits::StructureFile`] interface.
//! Contact matrices travel as whitespace-delimited numeric text ([`adjacency`]), and
//! analysis results leave as ordered residue → value mappings plus cluster dumps,
//! summaries and session descriptors ([`mapping`]).

pub mod adjacency;
pub mod mapping;
pub mod pdb;
pub mod traits;
