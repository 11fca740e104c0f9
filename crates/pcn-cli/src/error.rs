use pcnminer::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Everything that can end a `pcn` invocation with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// A batch-fatal error from the analysis engine.
    #[error("Analysis aborted: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read configuration file '{path}': {source}", path = path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Cannot open log file '{path}': {source}", path = path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("The analysis worker stopped unexpectedly: {0}")]
    Worker(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
