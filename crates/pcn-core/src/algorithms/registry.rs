use super::centrality;
use super::clustering;
use super::community::{fluid, greedy, infomap, leiden, louvain, spinglass, walktrap};
use super::embedding::{self, IN_OUT_PARAM, RETURN_PARAM, WalkParams};
use super::error::AlgorithmError;
use super::laplacian::LaplacianKind;
use super::spectral::{self, Partitioner};
use crate::core::models::network::ContactNetwork;
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Centrality,
    Spectral,
    Embedding,
    Community,
}

impl Family {
    pub const ALL: [Family; 4] = [
        Family::Centrality,
        Family::Spectral,
        Family::Embedding,
        Family::Community,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Centrality => "centrality",
            Self::Spectral => "spectral",
            Self::Embedding => "embeddings",
            Self::Community => "community",
        }
    }

    /// Directory under `output/` holding this family's results.
    pub fn output_dir(self) -> &'static str {
        match self {
            Self::Centrality => "Centralities",
            Self::Spectral => "Clusters",
            Self::Embedding => "ClustersEmbeddings",
            Self::Community => "Communities",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown analysis family '{0}' (expected centrality, spectral, embeddings or community)")]
pub struct ParseFamilyError(pub String);

impl FromStr for Family {
    type Err = ParseFamilyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "centrality" | "centralities" => Ok(Self::Centrality),
            "spectral" | "clustering" => Ok(Self::Spectral),
            "embedding" | "embeddings" => Ok(Self::Embedding),
            "community" | "communities" => Ok(Self::Community),
            _ => Err(ParseFamilyError(s.to_string())),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every analysis algorithm, in the order of the selection menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Closeness,
    EigenvectorCentrality,
    Betweenness,
    DegreeCentrality,

    UnnormSoftSpectral,
    NormSoftSpectral,
    UnnormHardSpectral,
    NormHardSpectral,
    ShiMalikHardSpectral,
    ShiMalikSoftSpectral,
    DegreeScaledSpectral,

    FuzzyCMeansHope,
    KMeansHope,
    FuzzyCMeansLaplacianEigenmaps,
    KMeansLaplacianEigenmaps,
    FuzzyCMeansNode2vec,
    KMeansNode2vec,

    Louvain,
    Leiden,
    Walktrap,
    FluidCommunities,
    GreedyModularity,
    Infomap,
    Spinglass,
}

/// Uniform entry point shared by every algorithm.
pub type Runner = fn(&ContactNetwork, &AlgorithmParams) -> Result<AlgorithmOutput, AlgorithmError>;

impl Algorithm {
    pub const ALL: [Algorithm; 24] = [
        Algorithm::Closeness,
        Algorithm::EigenvectorCentrality,
        Algorithm::Betweenness,
        Algorithm::DegreeCentrality,
        Algorithm::UnnormSoftSpectral,
        Algorithm::NormSoftSpectral,
        Algorithm::UnnormHardSpectral,
        Algorithm::NormHardSpectral,
        Algorithm::ShiMalikHardSpectral,
        Algorithm::ShiMalikSoftSpectral,
        Algorithm::DegreeScaledSpectral,
        Algorithm::FuzzyCMeansHope,
        Algorithm::KMeansHope,
        Algorithm::FuzzyCMeansLaplacianEigenmaps,
        Algorithm::KMeansLaplacianEigenmaps,
        Algorithm::FuzzyCMeansNode2vec,
        Algorithm::KMeansNode2vec,
        Algorithm::Louvain,
        Algorithm::Leiden,
        Algorithm::Walktrap,
        Algorithm::FluidCommunities,
        Algorithm::GreedyModularity,
        Algorithm::Infomap,
        Algorithm::Spinglass,
    ];

    /// The name used on the command line and in every output path.
    pub fn name(self) -> &'static str {
        match self {
            Self::Closeness => "closeness",
            Self::EigenvectorCentrality => "eigenvector_c",
            Self::Betweenness => "betweenness",
            Self::DegreeCentrality => "degree_c",
            Self::UnnormSoftSpectral => "unnorm_ssc",
            Self::NormSoftSpectral => "norm_ssc",
            Self::UnnormHardSpectral => "unnorm_hsc",
            Self::NormHardSpectral => "norm_hsc",
            Self::ShiMalikHardSpectral => "hsc_shimalik",
            Self::ShiMalikSoftSpectral => "ssc_shimalik",
            Self::DegreeScaledSpectral => "skl_spectral_clustering",
            Self::FuzzyCMeansHope => "fuzzycmeans_hope",
            Self::KMeansHope => "kmeans_hope",
            Self::FuzzyCMeansLaplacianEigenmaps => "fuzzycmeans_laplacianeigenmaps",
            Self::KMeansLaplacianEigenmaps => "kmeans_laplacianeigenmaps",
            Self::FuzzyCMeansNode2vec => "fuzzycmeans_node2vec",
            Self::KMeansNode2vec => "kmeans_node2vec",
            Self::Louvain => "louvain",
            Self::Leiden => "leiden",
            Self::Walktrap => "walktrap",
            Self::FluidCommunities => "asyn_fluidc",
            Self::GreedyModularity => "greedy_modularity",
            Self::Infomap => "infomap",
            Self::Spinglass => "spinglass",
        }
    }

    pub fn family(self) -> Family {
        match self {
            Self::Closeness
            | Self::EigenvectorCentrality
            | Self::Betweenness
            | Self::DegreeCentrality => Family::Centrality,
            Self::UnnormSoftSpectral
            | Self::NormSoftSpectral
            | Self::UnnormHardSpectral
            | Self::NormHardSpectral
            | Self::ShiMalikHardSpectral
            | Self::ShiMalikSoftSpectral
            | Self::DegreeScaledSpectral => Family::Spectral,
            Self::FuzzyCMeansHope
            | Self::KMeansHope
            | Self::FuzzyCMeansLaplacianEigenmaps
            | Self::KMeansLaplacianEigenmaps
            | Self::FuzzyCMeansNode2vec
            | Self::KMeansNode2vec => Family::Embedding,
            Self::Louvain
            | Self::Leiden
            | Self::Walktrap
            | Self::FluidCommunities
            | Self::GreedyModularity
            | Self::Infomap
            | Self::Spinglass => Family::Community,
        }
    }

    /// Whether the algorithm consumes a target cluster count from the k-grid.
    pub fn requires_k(self) -> bool {
        matches!(self.family(), Family::Spectral | Family::Embedding)
            || self == Self::FluidCommunities
    }

    /// The Laplacian whose eigengaps estimate k for this algorithm (spectral family only).
    pub fn laplacian(self) -> Option<LaplacianKind> {
        match self {
            Self::UnnormSoftSpectral | Self::UnnormHardSpectral => Some(LaplacianKind::Unnormalized),
            Self::NormSoftSpectral | Self::NormHardSpectral | Self::DegreeScaledSpectral => {
                Some(LaplacianKind::Normalized)
            }
            Self::ShiMalikHardSpectral | Self::ShiMalikSoftSpectral => {
                Some(LaplacianKind::Generalized)
            }
            _ => None,
        }
    }

    pub fn is_hope(self) -> bool {
        matches!(self, Self::FuzzyCMeansHope | Self::KMeansHope)
    }

    pub fn is_node2vec(self) -> bool {
        matches!(self, Self::FuzzyCMeansNode2vec | Self::KMeansNode2vec)
    }

    pub fn runner(self) -> Runner {
        match self {
            Self::Closeness => |net, _| Ok(AlgorithmOutput::Scores(centrality::closeness(net))),
            Self::EigenvectorCentrality => {
                |net, _| centrality::eigenvector(net).map(AlgorithmOutput::Scores)
            }
            Self::Betweenness => |net, _| Ok(AlgorithmOutput::Scores(centrality::betweenness(net))),
            Self::DegreeCentrality => |net, _| Ok(AlgorithmOutput::Scores(centrality::degree(net))),

            Self::UnnormSoftSpectral => |net, p| {
                spectral_labels(net, p, LaplacianKind::Unnormalized, Partitioner::Soft)
            },
            Self::NormSoftSpectral => |net, p| {
                spectral_labels(net, p, LaplacianKind::Normalized, Partitioner::Soft)
            },
            Self::UnnormHardSpectral => |net, p| {
                spectral_labels(net, p, LaplacianKind::Unnormalized, Partitioner::Hard)
            },
            Self::NormHardSpectral => |net, p| {
                spectral_labels(net, p, LaplacianKind::Normalized, Partitioner::Hard)
            },
            Self::ShiMalikHardSpectral => |net, p| {
                spectral_labels(net, p, LaplacianKind::Generalized, Partitioner::Hard)
            },
            Self::ShiMalikSoftSpectral => |net, p| {
                spectral_labels(net, p, LaplacianKind::Generalized, Partitioner::Soft)
            },
            Self::DegreeScaledSpectral => |net, p| {
                spectral::degree_scaled_clustering(net, p.require_k()?, p.seed)
                    .map(AlgorithmOutput::Labels)
            },

            Self::FuzzyCMeansHope => |net, p| embedding_labels(net, p, Embedder::Hope, Partitioner::Soft),
            Self::KMeansHope => |net, p| embedding_labels(net, p, Embedder::Hope, Partitioner::Hard),
            Self::FuzzyCMeansLaplacianEigenmaps => {
                |net, p| embedding_labels(net, p, Embedder::LaplacianEigenmaps, Partitioner::Soft)
            }
            Self::KMeansLaplacianEigenmaps => {
                |net, p| embedding_labels(net, p, Embedder::LaplacianEigenmaps, Partitioner::Hard)
            }
            Self::FuzzyCMeansNode2vec => {
                |net, p| embedding_labels(net, p, Embedder::Node2vec, Partitioner::Soft)
            }
            Self::KMeansNode2vec => |net, p| embedding_labels(net, p, Embedder::Node2vec, Partitioner::Hard),

            Self::Louvain => |net, _| Ok(AlgorithmOutput::Labels(louvain::louvain(net))),
            Self::Leiden => |net, _| Ok(AlgorithmOutput::Labels(leiden::leiden(net))),
            Self::Walktrap => |net, _| Ok(AlgorithmOutput::Labels(walktrap::walktrap(net))),
            Self::FluidCommunities => |net, p| {
                fluid::fluid_communities(net, p.require_k()?, p.seed).map(AlgorithmOutput::Labels)
            },
            Self::GreedyModularity => {
                |net, _| Ok(AlgorithmOutput::Labels(greedy::greedy_modularity(net)))
            }
            Self::Infomap => |net, _| Ok(AlgorithmOutput::Labels(infomap::infomap(net))),
            Self::Spinglass => {
                |net, p| spinglass::spinglass(net, p.seed).map(AlgorithmOutput::Labels)
            }
        }
    }

    pub fn run(
        self,
        network: &ContactNetwork,
        params: &AlgorithmParams,
    ) -> Result<AlgorithmOutput, AlgorithmError> {
        (self.runner())(network, params)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown algorithm '{0}'")]
pub struct ParseAlgorithmError(pub String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| ParseAlgorithmError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
enum Embedder {
    Hope,
    LaplacianEigenmaps,
    Node2vec,
}

fn spectral_labels(
    network: &ContactNetwork,
    params: &AlgorithmParams,
    kind: LaplacianKind,
    partitioner: Partitioner,
) -> Result<AlgorithmOutput, AlgorithmError> {
    spectral::spectral_clustering(network, kind, partitioner, params.require_k()?, params.seed)
        .map(AlgorithmOutput::Labels)
}

fn embedding_labels(
    network: &ContactNetwork,
    params: &AlgorithmParams,
    embedder: Embedder,
    partitioner: Partitioner,
) -> Result<AlgorithmOutput, AlgorithmError> {
    let k = params.require_k()?;
    if k < 2 || k > network.len() {
        return Err(AlgorithmError::InvalidParameter(format!(
            "k = {} must satisfy 2 <= k <= {} (number of residues)",
            k,
            network.len()
        )));
    }
    let mut rng = StdRng::seed_from_u64(params.seed);
    let vectors: DMatrix<f64> = match embedder {
        Embedder::Hope => embedding::hope(network, params.dimension, params.beta)?,
        Embedder::LaplacianEigenmaps => embedding::laplacian_eigenmaps(network, params.dimension)?,
        Embedder::Node2vec => {
            let walk = WalkParams {
                walk_length: params.walk_length,
                num_walks: params.num_walks,
                p: RETURN_PARAM,
                q: IN_OUT_PARAM,
            };
            embedding::node2vec(network, params.dimension, &walk, &mut rng)?
        }
    };
    let labels = match partitioner {
        Partitioner::Hard => clustering::kmeans(&vectors, k, &mut rng)?,
        Partitioner::Soft => clustering::fuzzy_cmeans(&vectors, k, &mut rng)?,
    };
    Ok(AlgorithmOutput::Labels(labels))
}

/// Keyword parameters shared by every invocation; each algorithm reads what it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgorithmParams {
    pub k: Option<usize>,
    pub dimension: usize,
    pub beta: f64,
    pub walk_length: usize,
    pub num_walks: usize,
    pub seed: u64,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            k: None,
            dimension: 2,
            beta: 0.01,
            walk_length: 100,
            num_walks: 100,
            seed: 42,
        }
    }
}

impl AlgorithmParams {
    pub fn with_k(self, k: usize) -> Self {
        Self { k: Some(k), ..self }
    }

    fn require_k(&self) -> Result<usize, AlgorithmError> {
        self.k
            .ok_or_else(|| AlgorithmError::InvalidParameter("a cluster count k is required".into()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmOutput {
    /// One score per residue (centrality family).
    Scores(Vec<f64>),
    /// One compacted cluster/community label per residue.
    Labels(Vec<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown algorithm '{0}'")]
    Unknown(String),
    #[error("Algorithm '{name}' does not belong to the {family} family")]
    WrongFamily { name: String, family: Family },
    #[error("Algorithm '{0}' is not available on this platform")]
    Excluded(String),
    #[error("Selection index {index} is out of range for the {family} family (1..={max})")]
    IndexOutOfRange {
        index: usize,
        family: Family,
        max: usize,
    },
}

/// The result of resolving a user selection against a family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub algorithms: Vec<Algorithm>,
    pub unsupported: Vec<(String, RegistryError)>,
}

/// The algorithms available on one platform.
///
/// Platform exclusions happen here, at construction, so "all" can never expand to an
/// algorithm the platform lacks.
#[derive(Debug, Clone)]
pub struct AlgorithmRegistry {
    platform: Platform,
    available: Vec<Algorithm>,
}

impl AlgorithmRegistry {
    pub fn for_platform(platform: Platform) -> Self {
        let available = Algorithm::ALL
            .iter()
            .copied()
            .filter(|&a| !(platform == Platform::Windows && a == Algorithm::Infomap))
            .collect();
        Self {
            platform,
            available,
        }
    }

    pub fn current() -> Self {
        Self::for_platform(Platform::current())
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn supports(&self, algorithm: Algorithm) -> bool {
        self.available.contains(&algorithm)
    }

    /// The family's algorithms in menu order.
    pub fn algorithms(&self, family: Family) -> Vec<Algorithm> {
        self.available
            .iter()
            .copied()
            .filter(|a| a.family() == family)
            .collect()
    }

    pub fn resolve(&self, name: &str) -> Result<Algorithm, RegistryError> {
        let algorithm: Algorithm = name
            .parse()
            .map_err(|_| RegistryError::Unknown(name.trim().to_string()))?;
        if !self.supports(algorithm) {
            return Err(RegistryError::Excluded(algorithm.name().to_string()));
        }
        Ok(algorithm)
    }

    /// Resolves `all`, `0`, or a comma list of names and 1-based menu indices.
    ///
    /// Duplicates collapse to their first occurrence; entries that cannot be resolved are
    /// returned in [`Selection::unsupported`] instead of failing the whole selection.
    pub fn select(&self, family: Family, selection: &str) -> Selection {
        let menu = self.algorithms(family);
        let trimmed = selection.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed == "0" {
            return Selection {
                algorithms: menu,
                unsupported: Vec::new(),
            };
        }

        let mut result = Selection::default();
        for entry in trimmed.split(',').map(str::trim) {
            if entry.is_empty() || entry == "0" {
                continue;
            }
            let resolved = match entry.parse::<usize>() {
                Ok(index) => menu
                    .get(index.wrapping_sub(1))
                    .copied()
                    .ok_or(RegistryError::IndexOutOfRange {
                        index,
                        family,
                        max: menu.len(),
                    }),
                Err(_) => self.resolve(entry).and_then(|a| {
                    if a.family() == family {
                        Ok(a)
                    } else {
                        Err(RegistryError::WrongFamily {
                            name: a.name().to_string(),
                            family,
                        })
                    }
                }),
            };
            match resolved {
                Ok(a) if !result.algorithms.contains(&a) => result.algorithms.push(a),
                Ok(_) => {}
                Err(e) => result.unsupported.push((entry.to_string(), e)),
            }
        }
        result
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::community::fixtures::barbell;
    use crate::algorithms::labels;

    #[test]
    fn names_round_trip_through_from_str() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert!("kmeans".parse::<Algorithm>().is_err());
    }

    #[test]
    fn family_sizes_match_the_menus() {
        let registry = AlgorithmRegistry::for_platform(Platform::Unix);
        assert_eq!(registry.algorithms(Family::Centrality).len(), 4);
        assert_eq!(registry.algorithms(Family::Spectral).len(), 7);
        assert_eq!(registry.algorithms(Family::Embedding).len(), 6);
        assert_eq!(registry.algorithms(Family::Community).len(), 7);
    }

    #[test]
    fn windows_excludes_infomap_from_all() {
        let registry = AlgorithmRegistry::for_platform(Platform::Windows);
        let selection = registry.select(Family::Community, "all");
        assert_eq!(selection.algorithms.len(), 6);
        assert!(!selection.algorithms.contains(&Algorithm::Infomap));
        assert!(selection.unsupported.is_empty());
        assert_eq!(
            registry.resolve("infomap"),
            Err(RegistryError::Excluded("infomap".into()))
        );
    }

    #[test]
    fn selection_accepts_indices_and_names() {
        let registry = AlgorithmRegistry::for_platform(Platform::Unix);
        let selection = registry.select(Family::Spectral, "1, norm_hsc ,0,1");
        assert_eq!(
            selection.algorithms,
            vec![Algorithm::UnnormSoftSpectral, Algorithm::NormHardSpectral]
        );
        assert!(selection.unsupported.is_empty());
    }

    #[test]
    fn unknown_entries_are_reported_not_fatal() {
        let registry = AlgorithmRegistry::for_platform(Platform::Unix);
        let selection = registry.select(Family::Community, "louvain,pagerank,9,closeness");
        assert_eq!(selection.algorithms, vec![Algorithm::Louvain]);
        let entries: Vec<&str> = selection.unsupported.iter().map(|(e, _)| e.as_str()).collect();
        assert_eq!(entries, vec!["pagerank", "9", "closeness"]);
        assert!(matches!(selection.unsupported[2].1, RegistryError::WrongFamily { .. }));
    }

    #[test]
    fn every_selectable_algorithm_runs() {
        let net = barbell(5);
        let params = AlgorithmParams {
            walk_length: 10,
            num_walks: 5,
            ..AlgorithmParams::default()
        }
        .with_k(2);
        let registry = AlgorithmRegistry::current();
        for family in Family::ALL {
            for algorithm in registry.select(family, "all").algorithms {
                match algorithm.run(&net, &params) {
                    Ok(AlgorithmOutput::Scores(scores)) => {
                        assert_eq!(algorithm.family(), Family::Centrality);
                        assert_eq!(scores.len(), 10);
                    }
                    Ok(AlgorithmOutput::Labels(l)) => {
                        assert_eq!(l.len(), 10, "{}", algorithm);
                        assert_eq!(labels::compact(&l), l, "{}", algorithm);
                    }
                    Err(e) => panic!("{} failed: {}", algorithm, e),
                }
            }
        }
    }

    #[test]
    fn missing_k_is_an_invalid_parameter() {
        let err = Algorithm::NormHardSpectral
            .run(&barbell(3), &AlgorithmParams::default())
            .unwrap_err();
        assert!(matches!(err, AlgorithmError::InvalidParameter(_)));
    }

    #[test]
    fn family_parsing_accepts_original_spellings() {
        assert_eq!("embeddings".parse::<Family>().unwrap(), Family::Embedding);
        assert_eq!("Community".parse::<Family>().unwrap(), Family::Community);
        assert!("clusters2".parse::<Family>().is_err());
        assert_eq!(Family::Spectral.output_dir(), "Clusters");
    }
}
