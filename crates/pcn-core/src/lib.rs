//! # PCN Miner Core Library
//!
//! Construction and analysis of Protein Contact Networks (PCNs): residues become nodes,
//! spatial proximity becomes edges, and a battery of graph algorithms characterizes the
//! resulting network, producing per-residue labels and diversity scores.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict layered architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `ContactNetwork`),
//!   PDB and adjacency-matrix I/O, geometry helpers and contact matrix construction.
//!
//! - **[`algorithms`]: The Numerics.** A closed, compile-time checked registry of every
//!   supported analysis algorithm (centrality, spectral clustering, embedding + clustering,
//!   community detection), the eigengap best-k selector and the participation scorer.
//!
//! - **[`engine`]: The Plumbing.** Request configuration, the error taxonomy, progress
//!   reporting, the per-run network cache, the on-disk output layout and the batch report.
//!
//! - **[`workflows`]: The Public API.** The batch orchestrator that sweeps proteins ×
//!   algorithms × parameter grids and persists every result.

pub mod algorithms;
pub mod core;
pub mod engine;
pub mod workflows;
