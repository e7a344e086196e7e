use thiserror::Error;

/// Top-level error type for the Barista system.
///
/// Subsystem crates define their own error types and convert from this one
/// so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BaristaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for BaristaError {
    fn from(err: toml::de::Error) -> Self {
        BaristaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for BaristaError {
    fn from(err: serde_json::Error) -> Self {
        BaristaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Barista operations.
pub type Result<T> = std::result::Result<T, BaristaError>;
