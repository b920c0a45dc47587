//! Error types for Grayloggin Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown stream: {0}")]
    UnknownStream(String),
}

pub type Result<T> = std::result::Result<T, Error>;
