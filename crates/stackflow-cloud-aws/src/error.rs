//! AWS error types and their classification

use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use stackflow_cloud::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    #[error("{operation} could not reach CloudFormation: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("invalid request: {0}")]
    Build(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, AwsError>;

impl AwsError {
    pub(crate) fn from_sdk<E, R>(operation: &'static str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        if matches!(err, SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)) {
            return AwsError::Transport {
                operation,
                message: DisplayErrorContext(&err).to_string(),
            };
        }

        AwsError::Service {
            operation,
            code: err.code().map(str::to_string),
            message: err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string()),
        }
    }
}

const THROTTLING_CODES: [&str; 3] = ["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Map a CloudFormation error code and message onto the client classification
pub fn classify(code: Option<&str>, message: &str) -> ClientError {
    match code {
        Some(code) if THROTTLING_CODES.contains(&code) => {
            ClientError::Transient(format!("{code}: {message}"))
        }
        Some("ValidationError") if message.contains("does not exist") => ClientError::NotFound,
        Some("ValidationError") if message.contains("No updates are to be performed") => {
            ClientError::NoOpUpdate
        }
        Some(code) => ClientError::Fatal(format!("{code}: {message}")),
        None => ClientError::Fatal(message.to_string()),
    }
}

/// A FAILED change set whose reason says it had nothing to do
pub fn is_empty_change_set_reason(reason: &str) -> bool {
    reason.contains("didn't contain changes") || reason.contains("No updates are to be performed")
}

impl From<AwsError> for ClientError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Service { code, message, .. } => classify(code.as_deref(), &message),
            transport @ AwsError::Transport { .. } => ClientError::Transient(transport.to_string()),
            other => ClientError::Fatal(other.to_string()),
        }
    }
}
