use thiserror::Error;

/// Top-level error type for the Ensemble system.
///
/// Construction-time validation failures are `Config`, problems with the raw
/// dataset sources are `Data`. Out-of-range access to an already-built
/// catalog or dataset is a contract violation and panics instead of
/// returning an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnsembleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for EnsembleError {
    fn from(err: toml::de::Error) -> Self {
        EnsembleError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for EnsembleError {
    fn from(err: toml::ser::Error) -> Self {
        EnsembleError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for EnsembleError {
    fn from(err: serde_json::Error) -> Self {
        EnsembleError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Ensemble operations.
pub type Result<T> = std::result::Result<T, EnsembleError>;
