//! Error types for sitelens-core

use thiserror::Error;

/// Main error type for the sitelens-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Unrecognized time frame label.
    ///
    /// Fails closed: an unknown label never widens to "all time".
    #[error("unknown time frame: {0}")]
    UnknownTimeFrame(String),

    /// Traceback depth outside the valid range (must be >= 1)
    #[error("invalid traceback depth: {0}")]
    InvalidDepth(i64),
}

/// Result type alias for sitelens-core
pub type Result<T> = std::result::Result<T, Error>;
