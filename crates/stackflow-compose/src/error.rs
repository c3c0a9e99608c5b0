//! Orchestration errors

use stackflow_cloud::{ClientError, StackStatus};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Remote call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOperation {
    Create,
    Update,
    Delete,
    CreateChangeSet,
    ExecuteChangeSet,
}

impl fmt::Display for StackOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackOperation::Create => write!(f, "create"),
            StackOperation::Update => write!(f, "update"),
            StackOperation::Delete => write!(f, "delete"),
            StackOperation::CreateChangeSet => write!(f, "create change set"),
            StackOperation::ExecuteChangeSet => write!(f, "execute change set"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ComposeError {
    /// The stack is in a status no action is safe for
    #[error("stopping: stack {stack} is in {status} state")]
    Rejected { stack: String, status: StackStatus },

    #[error("failed while checking status of stack {stack}: {source}")]
    Status {
        stack: String,
        #[source]
        source: ClientError,
    },

    #[error("stack {stack}: {operation} failed: {source}")]
    Operation {
        stack: String,
        operation: StackOperation,
        #[source]
        source: ClientError,
    },

    #[error("stack {stack}: cannot read template {}: {source}", path.display())]
    Template {
        stack: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stack {stack} has no template source")]
    MissingTemplate { stack: String },

    /// Group-level wrapper, the first failure inside a flow
    #[error("[FLOW: {flow}] [STACK: {stack}] {source}")]
    Flow {
        flow: String,
        stack: String,
        #[source]
        source: Box<ComposeError>,
    },

    #[error("flow {flow} stopped before stack {stack}: run cancelled")]
    Cancelled { flow: String, stack: String },

    #[error("flow not found: {0}")]
    FlowNotFound(String),

    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

impl ComposeError {
    /// Flow name for group-level failures
    pub fn flow(&self) -> Option<&str> {
        match self {
            ComposeError::Flow { flow, .. } | ComposeError::Cancelled { flow, .. } => Some(flow),
            _ => None,
        }
    }

    /// Stack name, when the failure is tied to one
    pub fn stack(&self) -> Option<&str> {
        match self {
            ComposeError::Rejected { stack, .. }
            | ComposeError::Status { stack, .. }
            | ComposeError::Operation { stack, .. }
            | ComposeError::Template { stack, .. }
            | ComposeError::MissingTemplate { stack }
            | ComposeError::Flow { stack, .. }
            | ComposeError::Cancelled { stack, .. } => Some(stack),
            ComposeError::FlowNotFound(_) | ComposeError::WorkerPool(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ComposeError>;
