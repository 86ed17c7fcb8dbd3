//! Error types for the palette library

use thiserror::Error;

/// Input rejected before it reaches the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Label must be at least {min} characters.")]
    LabelTooShort { min: usize },

    #[error("Command cannot be empty.")]
    EmptyCommand,

    #[error("Category cannot be empty.")]
    EmptyCategory,

    #[error("Please enter a valid URL: {0}")]
    InvalidUrl(String),
}

/// Failure reading or writing the durable key-value backend
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Lookup failures against an in-memory collection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No {kind} found with id '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("Id prefix '{prefix}' matches {count} {kind}s; use more characters")]
    Ambiguous {
        kind: &'static str,
        prefix: String,
        count: usize,
    },
}

/// Failure of the command insight gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned {status}: {body}")]
    Provider {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} response contained no text")]
    EmptyResponse(&'static str),

    #[error("Response did not match the expected shape: {0}")]
    Schema(String),
}
