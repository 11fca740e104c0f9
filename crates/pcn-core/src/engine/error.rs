use super::config::ConfigError;
use crate::algorithms::error::AlgorithmError;
use crate::algorithms::registry::RegistryError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Structure error for protein '{protein}': {message}")]
    Structure { protein: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unsupported algorithm '{entry}': {source}")]
    UnsupportedAlgorithm {
        entry: String,
        #[source]
        source: RegistryError,
    },

    #[error("Spectral analysis failed for {algorithm}: {message}")]
    Spectral { algorithm: String, message: String },

    #[error(
        "Structure {} of protein '{protein}' has residues without a chain identifier; set a default chain to proceed",
        path.display()
    )]
    ChainAnnotation { protein: String, path: PathBuf },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Algorithm {algorithm} failed: {source}")]
    Algorithm {
        algorithm: String,
        #[source]
        source: AlgorithmError,
    },
}

impl EngineError {
    /// Whether the error stops the whole batch rather than a single unit of work.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Structure { .. } | EngineError::Config(_) | EngineError::Io { .. }
        )
    }

    /// Whether the error ends the remaining work for the current protein.
    pub fn is_protein_fatal(&self) -> bool {
        self.is_batch_fatal() || matches!(self, EngineError::ChainAnnotation { .. })
    }

    pub fn structure(protein: &str, error: impl std::fmt::Display) -> Self {
        EngineError::Structure {
            protein: protein.to_string(),
            message: error.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Classifies an algorithm failure: eigendecomposition problems become
    /// [`EngineError::Spectral`], everything else [`EngineError::Algorithm`].
    pub fn algorithm(algorithm: &str, source: AlgorithmError) -> Self {
        match source {
            AlgorithmError::Spectral(message) => EngineError::Spectral {
                algorithm: algorithm.to_string(),
                message,
            },
            source => EngineError::Algorithm {
                algorithm: algorithm.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatality_follows_the_taxonomy() {
        assert!(EngineError::structure("1abc", "missing").is_batch_fatal());
        assert!(EngineError::Config(ConfigError::MissingParameter("family")).is_batch_fatal());
        let spectral = EngineError::algorithm("norm_hsc", AlgorithmError::Spectral("small".into()));
        assert!(matches!(spectral, EngineError::Spectral { .. }));
        assert!(!spectral.is_batch_fatal());
        assert!(!spectral.is_protein_fatal());
        let chain = EngineError::ChainAnnotation {
            protein: "1abc".into(),
            path: PathBuf::from("input/1abc.pdb"),
        };
        assert!(!chain.is_batch_fatal());
        assert!(chain.is_protein_fatal());
    }

    #[test]
    fn other_algorithm_errors_keep_their_source() {
        let err = EngineError::algorithm(
            "asyn_fluidc",
            AlgorithmError::Disconnected {
                algorithm: "asyn_fluidc",
                components: 2,
            },
        );
        assert!(matches!(err, EngineError::Algorithm { .. }));
        assert!(err.to_string().contains("connected"));
    }
}
