//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring the parser or persisting corrections.
///
/// Matching itself never fails: input that cannot be understood yields a
/// command with no intent.
#[derive(Debug, Error)]
pub enum ParserError {
    /// An intent definition carried a regex that does not compile.
    #[error("invalid pattern for intent '{intent}': {pattern}")]
    InvalidPattern {
        intent: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Configuration JSON was malformed.
    #[error("invalid config: {0}")]
    ConfigFormat(#[from] serde_json::Error),
    /// The persistence collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure reported by a `PatternStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pattern store unavailable: {0}")]
    Unavailable(String),
    #[error("pattern store rejected write: {0}")]
    Write(String),
}

/// Failure reported by an intent handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Parameters did not pass the handler's validation.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// The handler ran and failed.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}
