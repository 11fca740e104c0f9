mod defaults;

pub use defaults::DefaultsConfig;

use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use pcnminer::algorithms::registry::Family;
use pcnminer::core::models::network::{EdgeWeighting, Representative};
use pcnminer::engine::config::{
    AnalysisRequest, AnalysisRequestBuilder, EmbeddingParams, KGrid, NetworkSource,
    ProteinSelection,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// `k` may be written as `"best_k"`, `"2,3"` or `[2, 3]`.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum PartialKGrid {
    List(Vec<usize>),
    Text(String),
}

impl PartialKGrid {
    fn into_grid(self) -> Result<KGrid> {
        match self {
            PartialKGrid::List(ks) if ks.is_empty() => {
                Err(CliError::Config("`clustering.k` must not be empty.".to_string()))
            }
            PartialKGrid::List(ks) => Ok(KGrid::Explicit(ks)),
            PartialKGrid::Text(text) => parse_value("clustering.k", &text),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialBatchConfig {
    working_dir: Option<PathBuf>,
    proteins: Option<String>,
    family: Option<String>,
    algorithms: Option<String>,
    participation: Option<bool>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialNetworkConfig {
    representative: Option<String>,
    min_distance: Option<f64>,
    max_distance: Option<f64>,
    weighting: Option<String>,
    source: Option<String>,
    default_chain: Option<char>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialClusteringConfig {
    k: Option<PartialKGrid>,
    n_best_ks: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialEmbeddingConfig {
    dimension: Option<usize>,
    beta: Option<f64>,
    walk_length: Option<usize>,
    num_walks: Option<usize>,
}

/// The analysis configuration as read from a TOML file; every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisConfig {
    analysis: Option<PartialBatchConfig>,
    network: Option<PartialNetworkConfig>,
    clustering: Option<PartialClusteringConfig>,
    embedding: Option<PartialEmbeddingConfig>,
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: {}", key, e)))
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid numeric value for {}: {}", key, value))
    })
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, or starts empty.
    pub fn load(args: &AnalyzeArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Command line wins over `-S`, which wins over the file, which wins over the defaults.
    pub fn merge_with_cli(
        mut self,
        args: &AnalyzeArgs,
        defaults: &DefaultsConfig,
    ) -> Result<AnalysisRequest> {
        self.apply_set_values(&args.set_values)?;

        let batch = self.analysis.take().unwrap_or_default();
        let network = self.network.take().unwrap_or_default();
        let clustering = self.clustering.take().unwrap_or_default();
        let embedding = self.embedding.take().unwrap_or_default();

        let working_dir = args
            .working_dir
            .clone()
            .or(batch.working_dir)
            .ok_or_else(|| {
                CliError::Config(
                    "A working directory is required either in the config file or via --working-dir."
                        .to_string(),
                )
            })?;
        let family_name = args.family.clone().or(batch.family).ok_or_else(|| {
            CliError::Config(
                "An algorithm family is required either in the config file or via --family."
                    .to_string(),
            )
        })?;
        let family: Family = parse_value("family", &family_name)?;

        let proteins: ProteinSelection = parse_value(
            "proteins",
            args.proteins
                .as_deref()
                .or(batch.proteins.as_deref())
                .unwrap_or(&defaults.proteins),
        )?;
        let algorithms = args
            .algorithms
            .clone()
            .or(batch.algorithms)
            .unwrap_or_else(|| defaults.algorithms.clone());

        let representative: Representative = parse_value(
            "representative",
            args.representative
                .as_deref()
                .or(network.representative.as_deref())
                .unwrap_or(&defaults.representative),
        )?;
        let weighting: EdgeWeighting = parse_value(
            "weighting",
            args.weighting
                .as_deref()
                .or(network.weighting.as_deref())
                .unwrap_or(&defaults.weighting),
        )?;
        let source: NetworkSource = if args.from_adj {
            NetworkSource::Adj
        } else {
            parse_value(
                "source",
                network.source.as_deref().unwrap_or(&defaults.source),
            )?
        };
        let min = args
            .min
            .or(network.min_distance)
            .unwrap_or(defaults.min_distance);
        let max = args
            .max
            .or(network.max_distance)
            .unwrap_or(defaults.max_distance);

        let k_grid = match (&args.k, clustering.k) {
            (Some(text), _) => parse_value("k", text)?,
            (None, Some(partial)) => partial.into_grid()?,
            (None, None) => parse_value("k", &defaults.k)?,
        };
        let n_best_ks = args
            .n_best_ks
            .or(clustering.n_best_ks)
            .unwrap_or(defaults.n_best_ks);

        let embedding_params = EmbeddingParams {
            dimension: args
                .dimension
                .or(embedding.dimension)
                .unwrap_or(defaults.dimension),
            beta: args.beta.or(embedding.beta).unwrap_or(defaults.beta),
            walk_length: args
                .walk_length
                .or(embedding.walk_length)
                .unwrap_or(defaults.walk_length),
            num_walks: args
                .num_walks
                .or(embedding.num_walks)
                .unwrap_or(defaults.num_walks),
        };

        AnalysisRequestBuilder::new()
            .working_dir(working_dir)
            .proteins(proteins)
            .family(family)
            .algorithms(algorithms)
            .representative(representative)
            .thresholds(min, max)
            .weighting(weighting)
            .source(source)
            .k_grid(k_grid.with_candidates(n_best_ks))
            .embedding(embedding_params)
            .participation(
                args.participation
                    || batch.participation.unwrap_or(defaults.participation),
            )
            .seed(args.seed.or(batch.seed).unwrap_or(defaults.seed))
            .default_chain(args.default_chain.or(network.default_chain))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "analysis.proteins" => {
                    self.analysis.get_or_insert_with(Default::default).proteins = Some(value.to_string());
                }
                "analysis.family" => {
                    self.analysis.get_or_insert_with(Default::default).family = Some(value.to_string());
                }
                "analysis.algorithms" => {
                    self.analysis.get_or_insert_with(Default::default).algorithms = Some(value.to_string());
                }
                "analysis.participation" => {
                    self.analysis.get_or_insert_with(Default::default).participation =
                        Some(parse_value(key, value)?);
                }
                "analysis.seed" => {
                    self.analysis.get_or_insert_with(Default::default).seed = Some(parse_number(key, value)?);
                }
                "network.representative" => {
                    self.network.get_or_insert_with(Default::default).representative =
                        Some(value.to_string());
                }
                "network.min-distance" => {
                    self.network.get_or_insert_with(Default::default).min_distance =
                        Some(parse_number(key, value)?);
                }
                "network.max-distance" => {
                    self.network.get_or_insert_with(Default::default).max_distance =
                        Some(parse_number(key, value)?);
                }
                "network.weighting" => {
                    self.network.get_or_insert_with(Default::default).weighting =
                        Some(value.to_string());
                }
                "network.source" => {
                    self.network.get_or_insert_with(Default::default).source =
                        Some(value.to_string());
                }
                "clustering.k" => {
                    self.clustering.get_or_insert_with(Default::default).k =
                        Some(PartialKGrid::Text(value.to_string()));
                }
                "clustering.n-best-ks" => {
                    self.clustering.get_or_insert_with(Default::default).n_best_ks =
                        Some(parse_number(key, value)?);
                }
                "embedding.dimension" => {
                    self.embedding.get_or_insert_with(Default::default).dimension =
                        Some(parse_number(key, value)?);
                }
                "embedding.beta" => {
                    self.embedding.get_or_insert_with(Default::default).beta =
                        Some(parse_number(key, value)?);
                }
                "embedding.walk-length" => {
                    self.embedding.get_or_insert_with(Default::default).walk_length =
                        Some(parse_number(key, value)?);
                }
                "embedding.num-walks" => {
                    self.embedding.get_or_insert_with(Default::default).num_walks =
                        Some(parse_number(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
