use crate::algorithms::registry::{AlgorithmParams, Family, ParseFamilyError};
use crate::core::contacts::builder::ContactParams;
use crate::core::models::network::{
    BandError, EdgeWeighting, ParseRepresentativeError, Representative, ThresholdBand,
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value '{value}' for {parameter}: {reason}")]
    InvalidValue {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    UnknownFamily(#[from] ParseFamilyError),

    #[error("Unknown initial choice '{0}' (expected 'pdb' or 'adj')")]
    UnknownInitialChoice(String),

    #[error("Invalid threshold band: {0}")]
    Thresholds(#[from] BandError),

    #[error("Working directory {path} is not usable: {reason}")]
    WorkingDirectory { path: PathBuf, reason: String },
}

impl From<ParseRepresentativeError> for ConfigError {
    fn from(e: ParseRepresentativeError) -> Self {
        ConfigError::InvalidValue {
            parameter: "representative",
            value: e.0,
            reason: "expected CA, CB or centroid".into(),
        }
    }
}

/// Where the contact networks come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkSource {
    /// Build from `input/<protein>.pdb` and write the matrix to `outputAdj/`.
    #[default]
    Pdb,
    /// Read the precomputed matrix from `adj/`.
    Adj,
}

impl FromStr for NetworkSource {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdb" => Ok(Self::Pdb),
            "adj" => Ok(Self::Adj),
            _ => Err(ConfigError::UnknownInitialChoice(s.to_string())),
        }
    }
}

impl fmt::Display for NetworkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdb => "pdb",
            Self::Adj => "adj",
        })
    }
}

/// The cluster counts to sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KGrid {
    /// Derive the top `candidates` counts from the Laplacian eigengaps.
    BestK { candidates: usize },
    Explicit(Vec<usize>),
}

impl Default for KGrid {
    fn default() -> Self {
        KGrid::BestK { candidates: 1 }
    }
}

impl KGrid {
    pub fn with_candidates(self, candidates: usize) -> Self {
        match self {
            KGrid::BestK { .. } => KGrid::BestK { candidates },
            explicit => explicit,
        }
    }
}

impl FromStr for KGrid {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("best_k") {
            return Ok(KGrid::default());
        }
        let invalid = |reason: &str| ConfigError::InvalidValue {
            parameter: "k",
            value: s.to_string(),
            reason: reason.to_string(),
        };
        let ks = trimmed
            .split(',')
            .map(|item| item.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid("expected 'best_k' or a comma-separated list of integers"))?;
        if ks.is_empty() {
            return Err(invalid("the k list is empty"));
        }
        Ok(KGrid::Explicit(ks))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProteinSelection {
    /// Every `*.pdb` file in the input directory.
    All,
    List(Vec<String>),
}

impl FromStr for ProteinSelection {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let proteins: Vec<String> = s
            .split(',')
            .map(|p| p.trim().to_lowercase())
            .map(|p| p.strip_suffix(".pdb").map(str::to_string).unwrap_or(p))
            .filter(|p| !p.is_empty())
            .collect();
        if proteins.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "proteins",
                value: s.to_string(),
                reason: "no protein identifiers given".into(),
            });
        }
        Ok(Self::List(proteins))
    }
}

/// Hyperparameters of the embedding family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingParams {
    pub dimension: usize,
    pub beta: f64,
    pub walk_length: usize,
    pub num_walks: usize,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            dimension: 2,
            beta: 0.01,
            walk_length: 100,
            num_walks: 100,
        }
    }
}

/// One orchestrator run. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub working_dir: PathBuf,
    pub proteins: ProteinSelection,
    pub family: Family,
    pub algorithms: String,
    pub contacts: ContactParams,
    pub source: NetworkSource,
    pub k_grid: KGrid,
    pub embedding: EmbeddingParams,
    pub participation: bool,
    pub seed: u64,
    pub default_chain: Option<char>,
}

impl AnalysisRequest {
    /// Algorithm keyword arguments with no `k` set.
    pub fn algorithm_params(&self) -> AlgorithmParams {
        AlgorithmParams {
            k: None,
            dimension: self.embedding.dimension,
            beta: self.embedding.beta,
            walk_length: self.embedding.walk_length,
            num_walks: self.embedding.num_walks,
            seed: self.seed,
        }
    }
}

#[derive(Default)]
pub struct AnalysisRequestBuilder {
    working_dir: Option<PathBuf>,
    proteins: Option<ProteinSelection>,
    family: Option<Family>,
    algorithms: Option<String>,
    representative: Option<Representative>,
    thresholds: Option<(f64, f64)>,
    weighting: Option<EdgeWeighting>,
    source: Option<NetworkSource>,
    k_grid: Option<KGrid>,
    embedding: Option<EmbeddingParams>,
    participation: Option<bool>,
    seed: Option<u64>,
    default_chain: Option<char>,
}

impl AnalysisRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
    pub fn proteins(mut self, selection: ProteinSelection) -> Self {
        self.proteins = Some(selection);
        self
    }
    pub fn family(mut self, family: Family) -> Self {
        self.family = Some(family);
        self
    }
    pub fn algorithms(mut self, selection: impl Into<String>) -> Self {
        self.algorithms = Some(selection.into());
        self
    }
    pub fn representative(mut self, representative: Representative) -> Self {
        self.representative = Some(representative);
        self
    }
    pub fn thresholds(mut self, min: f64, max: f64) -> Self {
        self.thresholds = Some((min, max));
        self
    }
    pub fn weighting(mut self, weighting: EdgeWeighting) -> Self {
        self.weighting = Some(weighting);
        self
    }
    pub fn source(mut self, source: NetworkSource) -> Self {
        self.source = Some(source);
        self
    }
    pub fn k_grid(mut self, grid: KGrid) -> Self {
        self.k_grid = Some(grid);
        self
    }
    pub fn embedding(mut self, params: EmbeddingParams) -> Self {
        self.embedding = Some(params);
        self
    }
    pub fn participation(mut self, enabled: bool) -> Self {
        self.participation = Some(enabled);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn default_chain(mut self, chain: Option<char>) -> Self {
        self.default_chain = chain;
        self
    }

    pub fn build(self) -> Result<AnalysisRequest, ConfigError> {
        let working_dir = self
            .working_dir
            .ok_or(ConfigError::MissingParameter("working_dir"))?;
        let proteins = self
            .proteins
            .ok_or(ConfigError::MissingParameter("proteins"))?;
        let family = self.family.ok_or(ConfigError::MissingParameter("family"))?;

        let band = match self.thresholds {
            Some((min, max)) => ThresholdBand::new(min, max)?,
            None => ThresholdBand::default(),
        };

        let k_grid = self.k_grid.unwrap_or_default();
        match &k_grid {
            KGrid::BestK { candidates: 0 } => {
                return Err(ConfigError::InvalidValue {
                    parameter: "n_best_ks",
                    value: "0".into(),
                    reason: "at least one candidate is required".into(),
                });
            }
            KGrid::Explicit(ks) if ks.is_empty() => {
                return Err(ConfigError::InvalidValue {
                    parameter: "k",
                    value: String::new(),
                    reason: "the k list is empty".into(),
                });
            }
            _ => {}
        }

        let embedding = self.embedding.unwrap_or_default();
        if !(embedding.beta.is_finite() && embedding.beta > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "beta",
                value: embedding.beta.to_string(),
                reason: "must be a positive number".into(),
            });
        }

        Ok(AnalysisRequest {
            working_dir,
            proteins,
            family,
            algorithms: self.algorithms.unwrap_or_else(|| "all".to_string()),
            contacts: ContactParams {
                representative: self.representative.unwrap_or_default(),
                band,
                weighting: self.weighting.unwrap_or_default(),
            },
            source: self.source.unwrap_or_default(),
            k_grid,
            embedding,
            participation: self.participation.unwrap_or(false),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            default_chain: self.default_chain,
        })
    }
}
