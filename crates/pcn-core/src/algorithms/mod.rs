//! # Algorithms Module
//!
//! Every analysis that runs on a [`ContactNetwork`](crate::core::models::network::ContactNetwork).
//!
//! ## Overview
//!
//! - **Registry** ([`registry`]) - The closed set of algorithms, their families and the
//!   platform-filtered selection lists
//! - **Centrality** ([`centrality`]) - Closeness, betweenness, eigenvector and degree
//! - **Spectral Clustering** ([`spectral`]) - Laplacian embeddings followed by k-means or
//!   fuzzy c-means, built on [`laplacian`] and [`clustering`]
//! - **Embeddings** ([`embedding`]) - HOPE, Laplacian eigenmaps and node2vec node vectors
//! - **Community Detection** ([`community`]) - Modularity, random-walk, flow and spin-glass
//!   based partitions
//! - **Selection and Scoring** ([`best_k`], [`participation`]) - Eigengap cluster-count
//!   estimation and per-node participation / z-intraconnectivity
//!
//! All functions are pure over their inputs. Randomized methods take an explicit seed and
//! every label vector leaving this module is compacted (see [`labels`]).

pub mod best_k;
pub mod centrality;
pub mod clustering;
pub mod community;
pub mod embedding;
pub mod error;
pub mod labels;
pub mod laplacian;
pub mod participation;
pub mod registry;
pub mod spectral;
