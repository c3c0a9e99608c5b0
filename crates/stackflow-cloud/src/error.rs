//! Client error classification
//!
//! Adapters translate vendor error codes into these variants before they
//! reach the lifecycle code.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("stack does not exist")]
    NotFound,

    #[error("no updates are to be performed")]
    NoOpUpdate,

    #[error("change set contains no changes")]
    EmptyChangeSet,

    #[error("transient error: {0}")]
    Transient(String),

    #[error("{0}")]
    Fatal(String),

    #[error("timed out after {waited:?} waiting for stack {stack}")]
    Timeout { stack: String, waited: Duration },
}

impl ClientError {
    pub fn fatal(message: impl Into<String>) -> Self {
        ClientError::Fatal(message.into())
    }

    /// Whether a poll loop may retry after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
