//! Error types for proctor-core

use thiserror::Error;

/// Top-level error type for proctor-core
#[derive(Error, Debug)]
pub enum ProctorError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    #[error("Progress recording error: {0}")]
    Record(#[from] RecordError),
}

/// Errors returned by session commands
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("Command requires a {expected} session, but this is a {actual} session")]
    WrongMode { expected: String, actual: String },

    #[error("Item index {index} is out of range (session has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Evaluation result discarded: the session moved on while it was in flight")]
    StaleResult,

    #[error("Provisioning failed: {0}")]
    Provision(#[from] ProvisionError),
}

/// Errors from problem and quiz provisioners
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Provisioner returned no items")]
    Empty,

    #[error("Malformed provisioning output: {reason}")]
    Malformed { reason: String },

    #[error("Provisioner backend error: {0}")]
    Backend(String),

    #[error("Failed to read problem pack: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse problem pack: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ProvisionError {
    /// Convenience constructor for validation failures
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Errors from whatever backs a judge (transport, reply parsing)
///
/// These never escape a [`Judge`](crate::judge::Judge); they are folded into a
/// RuntimeError outcome.
#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("unparseable backend reply: {0}")]
    InvalidReply(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors from hint advisors
#[derive(Error, Debug)]
pub enum HintError {
    #[error("hint advisor unavailable: {0}")]
    Unavailable(String),

    #[error("hint advisor returned an unusable reply: {0}")]
    InvalidReply(String),
}

/// Errors from progress recorders
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
