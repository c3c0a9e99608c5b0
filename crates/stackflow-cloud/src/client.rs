//! Control-plane client trait

use crate::changeset::ChangeSetHandle;
use crate::error::Result;
use crate::request::StackRequest;
use crate::status::StackStatus;
use async_trait::async_trait;

/// Operations the lifecycle code needs from the control plane
///
/// Implementations must be safe for concurrent calls against different stack
/// names. Every `*_and_wait` method blocks until the remote operation reaches a
/// terminal state; retries and polling live inside the implementation.
#[async_trait]
pub trait StackClient: Send + Sync {
    /// Current status. An unknown stack is [`ClientError::NotFound`](crate::ClientError::NotFound).
    async fn describe_status(&self, stack_name: &str) -> Result<StackStatus>;

    async fn create_and_wait(&self, request: &StackRequest) -> Result<()>;

    /// Fails with [`ClientError::NoOpUpdate`](crate::ClientError::NoOpUpdate)
    /// when the template and parameters match what is deployed.
    async fn update_and_wait(&self, request: &StackRequest) -> Result<()>;

    async fn delete_and_wait(&self, stack_name: &str) -> Result<()>;

    /// Fails with [`ClientError::EmptyChangeSet`](crate::ClientError::EmptyChangeSet)
    /// when the change set would not change anything.
    async fn create_change_set_and_wait(
        &self,
        request: &StackRequest,
        change_set_name: &str,
    ) -> Result<ChangeSetHandle>;

    async fn execute_change_set_and_wait(&self, change_set: &ChangeSetHandle) -> Result<()>;
}
