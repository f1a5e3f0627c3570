//! Error types for model backends.

use proctor_core::{HintError, JudgeError, ProvisionError};
use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a model.
#[derive(Debug, Error)]
pub enum Error {
    /// Request failed before a reply arrived.
    #[error("request failed: {0}")]
    Request(String),

    /// Provider answered with an error status.
    #[error("provider API error: {0}")]
    ProviderApi(String),

    /// Reply arrived but does not have the requested shape.
    #[error("invalid model reply: {0}")]
    InvalidReply(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<Error> for JudgeError {
    fn from(err: Error) -> Self {
        match err {
            Error::Request(message) => JudgeError::Unreachable(message),
            Error::ProviderApi(message) => JudgeError::Backend(message),
            other => JudgeError::InvalidReply(other.to_string()),
        }
    }
}

impl From<Error> for ProvisionError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidReply(reason) => ProvisionError::Malformed { reason },
            Error::Serialization(e) => ProvisionError::Parse(e),
            other => ProvisionError::Backend(other.to_string()),
        }
    }
}

impl From<Error> for HintError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidReply(reason) => HintError::InvalidReply(reason),
            other => HintError::Unavailable(other.to_string()),
        }
    }
}
