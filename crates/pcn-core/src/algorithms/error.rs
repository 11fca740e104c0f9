use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlgorithmError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Spectral decomposition failed: {0}")]
    Spectral(String),
    #[error("{algorithm} requires a connected network ({components} components found)")]
    Disconnected {
        algorithm: &'static str,
        components: usize,
    },
    #[error("Numerical failure: {0}")]
    Numerical(String),
}
