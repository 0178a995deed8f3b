//! Error types for the port-out validation service.
//!
//! None of these ever reach a caller as-is: the HTTP handler maps every
//! collaborator fault to a 7598 verdict. They exist for startup failures and
//! for the logs.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Record store errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),
}

/// Errors raised while turning a request body into a `PortOutRequest`.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Element <{0}> is never closed")]
    UnclosedElement(String),

    #[error("Request body is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors raised while rendering a verdict.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Failed to write XML: {0}")]
    Write(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
