//! Error types for case search.

use thiserror::Error;

/// Result type alias using the case search Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for case search operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A filter value does not map to any known enum label
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row's column values could not be decoded
    #[error("Scan error: {0}")]
    Scan(String),

    /// A stored enum code has no known label
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Normalization(_) => "normalization",
            Error::Database(_) => "query_execution",
            Error::Scan(_) => "scan",
            Error::DataIntegrity(_) => "data_integrity",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config(_) => "config",
        }
    }
}
