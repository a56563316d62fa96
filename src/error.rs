//! Error types for the review generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the transport seam before an HTTP status is available.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connect(String),

    #[error("HTTP error: {0}")]
    Other(String),

    #[error("Failed to create HTTP client: {0}")]
    Build(String),
}

impl TransportError {
    /// Network-level failures are worth another attempt; a client that cannot
    /// be built never will be.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::Build(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if error.is_builder() {
            TransportError::Build(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

/// Library-wide error type.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No API key provided. Set the {env_var} environment variable, `api.api_key`, or pass --api-key")]
    MissingCredential { env_var: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rate limit exceeded (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Request rejected with status {status}: {body}")]
    RequestRejected { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("Empty completion received for {title}")]
    EmptyCompletion { title: String },

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),

    #[error("Failed to generate review for {title} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        title: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Failed to get user input: {0}")]
    Interaction(String),

    #[error("Background batch task failed: {0}")]
    Task(String),
}

impl ReviewError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReviewError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the retry loop should try again after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReviewError::RateLimited { .. } => true,
            ReviewError::ServerError { .. } => true,
            ReviewError::Network(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for ReviewError {
    fn from(err: config::ConfigError) -> Self {
        ReviewError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ReviewError {
    fn from(err: tokio::task::JoinError) -> Self {
        ReviewError::Task(err.to_string())
    }
}

impl From<dialoguer::Error> for ReviewError {
    fn from(err: dialoguer::Error) -> Self {
        ReviewError::Interaction(err.to_string())
    }
}
