use thiserror::Error;

/// Top-level error type for Metzia.
#[derive(Debug, Error)]
pub enum MetziaError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from a product search backend.
    #[error("search error: {0}")]
    Search(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
