use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Ugo Lomoio, Pietro Hiram Guzzi, Serena Rosignoli",
    version,
    about = "PCN Miner CLI - Build Protein Contact Networks from PDB structures and analyze them with centrality, spectral clustering, embedding and community detection algorithms.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build contact networks for a batch of proteins and run a family of algorithms on them.
    Analyze(AnalyzeArgs),
    /// List the algorithms available on this platform, with their menu indices.
    Algorithms(AlgorithmsArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    // --- Batch ---
    /// Working directory holding `input/` (and `adj/` for precomputed matrices).
    #[arg(short, long, value_name = "PATH")]
    pub working_dir: Option<PathBuf>,

    /// Proteins to analyze: `all`, or a comma-separated list of PDB identifiers.
    #[arg(short, long, value_name = "LIST")]
    pub proteins: Option<String>,

    /// Algorithm family: centrality, spectral, embeddings or community.
    #[arg(short, long, value_name = "FAMILY")]
    pub family: Option<String>,

    /// Algorithms to run: `all`, or a comma-separated list of names or menu indices.
    #[arg(short, long, value_name = "SEL")]
    pub algorithms: Option<String>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Network Overrides ---
    /// Representative atom of each residue: CA, CB or centroid.
    #[arg(short, long, value_name = "TYPE")]
    pub representative: Option<String>,

    /// Minimum contact distance in Ångström.
    #[arg(long, value_name = "FLOAT")]
    pub min: Option<f64>,

    /// Maximum contact distance in Ångström.
    #[arg(long, value_name = "FLOAT")]
    pub max: Option<f64>,

    /// Edge weighting: binary or inverse-distance.
    #[arg(long, value_name = "MODE")]
    pub weighting: Option<String>,

    /// Read precomputed adjacency matrices from `adj/` instead of building them.
    #[arg(long)]
    pub from_adj: bool,

    /// Chain to assume for residues whose chain column is blank.
    #[arg(long, value_name = "CHAR")]
    pub default_chain: Option<char>,

    // --- Clustering Overrides ---
    /// Cluster counts: `best_k`, or a comma-separated list of integers.
    #[arg(short, long, value_name = "K")]
    pub k: Option<String>,

    /// Number of eigengap candidates proposed by `best_k`.
    #[arg(long, value_name = "INT")]
    pub n_best_ks: Option<usize>,

    // --- Embedding Overrides ---
    /// Embedding dimension.
    #[arg(long, value_name = "INT")]
    pub dimension: Option<usize>,

    /// HOPE decay factor.
    #[arg(long, value_name = "FLOAT")]
    pub beta: Option<f64>,

    /// node2vec walk length.
    #[arg(long, value_name = "INT")]
    pub walk_length: Option<usize>,

    /// node2vec walks per node.
    #[arg(long, value_name = "INT")]
    pub num_walks: Option<usize>,

    // --- Scoring ---
    /// Also compute participation coefficients and z-intraconnectivity for every partition.
    #[arg(long)]
    pub participation: bool,

    /// Seed of every randomized algorithm.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S clustering.k=2,3
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `algorithms` subcommand.
#[derive(Args, Debug)]
pub struct AlgorithmsArgs {
    /// Only list this family.
    #[arg(short, long, value_name = "FAMILY")]
    pub family: Option<String>,
}
