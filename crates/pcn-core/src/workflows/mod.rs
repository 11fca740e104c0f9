//! # Workflows Module
//!
//! The public entry points of the library.
//!
//! ## Available Workflows
//!
//! - **Analysis** ([`analyze`]) - Sweeps proteins × algorithms × k values over a working
//!   directory: builds (or reads) one contact network per protein, runs every selected
//!   algorithm, reconciles cluster counts, persists labels, summaries, session descriptors
//!   and participation scores, and returns a per-unit [`BatchResult`](crate::engine::report::BatchResult).
//!
//! ## Error Handling
//!
//! Workflows return [`EngineError`](crate::engine::error::EngineError). Only errors that make
//! the rest of the batch meaningless abort the call; everything else is recorded per unit.

pub mod analyze;
