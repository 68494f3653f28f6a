use thiserror::Error;

/// Top-level error type for VetLLM.
///
/// Subsystem crates keep their own error enums and convert into this one
/// where they cross crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("HTTP server error: {0}")]
    Http(String),
}

impl From<serde_json::Error> for VetError {
    fn from(err: serde_json::Error) -> Self {
        VetError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for VetLLM operations.
pub type Result<T> = std::result::Result<T, VetError>;
