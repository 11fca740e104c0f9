//! # Engine Module
//!
//! The plumbing shared by every workflow: how a run is configured, how it fails, how it
//! reports progress, where its files go and what it returns.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - The immutable [`AnalysisRequest`](config::AnalysisRequest)
//!   and its builder, plus the k-grid, protein selection and network source types
//! - **Error Handling** ([`error`]) - The [`EngineError`](error::EngineError) taxonomy and
//!   its batch / protein / unit fatality classification
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Network Cache** ([`cache`]) - One built network per (protein, representative, band)
//! - **Output Layout** ([`layout`]) - The on-disk directory convention of a working directory
//! - **Batch Report** ([`report`]) - Per-unit outcomes returned to the caller and persisted
//!   as the run report

pub mod cache;
pub mod config;
pub mod error;
pub mod layout;
pub mod progress;
pub mod report;
