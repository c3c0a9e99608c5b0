//! Stack lifecycle
//!
//! Decides, from a freshly fetched remote status, whether a stack is created,
//! updated, deleted, skipped or rejected, and performs that action.
//!
//! Deploy:
//! - `DELETE_COMPLETE`, `DOESN'T EXIST`: create
//! - `CREATE_COMPLETE`, `UPDATE_COMPLETE`, `UPDATE_FAILED`, `UPDATE_ROLLBACK_COMPLETE`: update
//!   (change set preview in dry-run)
//! - anything else: reject
//!
//! Destroy:
//! - `DELETE_COMPLETE`, `DOESN'T EXIST`: skip
//! - `CREATE_COMPLETE`, `UPDATE_COMPLETE`, `ROLLBACK_COMPLETE`, `ROLLBACK_FAILED`,
//!   `UPDATE_ROLLBACK_COMPLETE`, `UPDATE_ROLLBACK_FAILED`, `DELETE_FAILED`: delete
//! - anything else: reject

use crate::context::ExecutionContext;
use crate::error::{ComposeError, Result, StackOperation};
use crate::reporter::{Reporter, StackProgress};
use crate::request::build_request;
use stackflow_cloud::{
    ChangeSetHandle, ClientError, StackClient, StackRequest, StackStatus, change_set_name,
};
use stackflow_core::Stack;
use std::sync::Arc;
use tracing::{Instrument, info, warn};

/// Terminal outcome for one stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackOutcome {
    Created,
    Updated,
    /// The control plane reported nothing to update
    Unchanged,
    /// Updated through a change set (`enable_change_set`)
    ChangeSetExecuted(ChangeSetHandle),
    Deleted,
    AlreadyDeleted,
    /// Dry-run: nothing was mutated
    Planned(PlannedChange),
}

/// What a dry-run found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedChange {
    Create,
    Update { change_set: ChangeSetHandle },
    NoChange,
    Delete,
    SkipDelete,
}

impl std::fmt::Display for StackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackOutcome::Created => write!(f, "created"),
            StackOutcome::Updated => write!(f, "updated"),
            StackOutcome::Unchanged => write!(f, "no updates"),
            StackOutcome::ChangeSetExecuted(cs) => {
                write!(f, "updated via change set {}", cs.change_set_name)
            }
            StackOutcome::Deleted => write!(f, "deleted"),
            StackOutcome::AlreadyDeleted => write!(f, "already deleted"),
            StackOutcome::Planned(PlannedChange::Create) => write!(f, "will be created"),
            StackOutcome::Planned(PlannedChange::Update { change_set }) => {
                write!(f, "will be updated, change set: {}", change_set.reference())
            }
            StackOutcome::Planned(PlannedChange::NoChange) => write!(f, "no change detected"),
            StackOutcome::Planned(PlannedChange::Delete) => write!(f, "will be deleted"),
            StackOutcome::Planned(PlannedChange::SkipDelete) => write!(f, "delete will be skipped"),
        }
    }
}

/// Applies the lifecycle decision table through a [`StackClient`]
#[derive(Clone)]
pub struct StackLifecycle {
    client: Arc<dyn StackClient>,
    reporter: Reporter,
}

impl StackLifecycle {
    pub fn new(client: Arc<dyn StackClient>, reporter: Reporter) -> Self {
        Self { client, reporter }
    }

    /// Bring a stack to its declared configuration.
    pub async fn apply(
        &self,
        ctx: &ExecutionContext,
        stack: &Stack,
        dry_run: bool,
    ) -> Result<StackOutcome> {
        let progress = self.reporter.start(ctx, "checking status");
        let result = self
            .apply_inner(stack, dry_run, &progress)
            .instrument(ctx.span())
            .await;
        finish(&progress, &result);
        result
    }

    /// Tear a stack down.
    pub async fn destroy(
        &self,
        ctx: &ExecutionContext,
        stack: &Stack,
        dry_run: bool,
    ) -> Result<StackOutcome> {
        let progress = self.reporter.start(ctx, "checking status");
        let result = self
            .destroy_inner(stack, dry_run, &progress)
            .instrument(ctx.span())
            .await;
        finish(&progress, &result);
        result
    }

    async fn status(&self, stack_name: &str) -> Result<StackStatus> {
        match self.client.describe_status(stack_name).await {
            Ok(status) => Ok(status),
            Err(ClientError::NotFound) => Ok(StackStatus::DoesNotExist),
            Err(source) => Err(ComposeError::Status {
                stack: stack_name.to_string(),
                source,
            }),
        }
    }

    async fn apply_inner(
        &self,
        stack: &Stack,
        dry_run: bool,
        progress: &StackProgress,
    ) -> Result<StackOutcome> {
        let name = stack.stack_name.as_str();
        let status = self.status(name).await?;

        if status.is_creatable() {
            if dry_run {
                info!(status = %status, "Stack will be created");
                return Ok(StackOutcome::Planned(PlannedChange::Create));
            }

            info!(status = %status, "Creating stack");
            progress.set_message("creating");
            let request = build_request(stack).await?;
            self.client
                .create_and_wait(&request)
                .await
                .map_err(|source| operation_error(name, StackOperation::Create, source))?;
            info!("Stack created");
            return Ok(StackOutcome::Created);
        }

        if status.is_updatable() {
            let request = build_request(stack).await?;
            if dry_run {
                progress.set_message("computing change set");
                return self.preview(&request, &status).await;
            }
            if stack.enable_change_set {
                return self.update_through_change_set(&request, &status, progress).await;
            }

            info!(status = %status, "Updating stack");
            progress.set_message("updating");
            return match self.client.update_and_wait(&request).await {
                Ok(()) => {
                    info!("Stack updated");
                    Ok(StackOutcome::Updated)
                }
                Err(ClientError::NoOpUpdate) => {
                    warn!("Skipping update: no updates are to be performed");
                    Ok(StackOutcome::Unchanged)
                }
                Err(source) => Err(operation_error(name, StackOperation::Update, source)),
            };
        }

        Err(ComposeError::Rejected {
            stack: name.to_string(),
            status,
        })
    }

    async fn destroy_inner(
        &self,
        stack: &Stack,
        dry_run: bool,
        progress: &StackProgress,
    ) -> Result<StackOutcome> {
        let name = stack.stack_name.as_str();
        let status = self.status(name).await?;

        if status.is_gone() {
            info!(status = %status, "Skipping delete");
            return Ok(if dry_run {
                StackOutcome::Planned(PlannedChange::SkipDelete)
            } else {
                StackOutcome::AlreadyDeleted
            });
        }

        if status.is_deletable() {
            if dry_run {
                info!(status = %status, "Stack will be deleted");
                return Ok(StackOutcome::Planned(PlannedChange::Delete));
            }

            info!(status = %status, "Deleting stack");
            progress.set_message("deleting");
            self.client
                .delete_and_wait(name)
                .await
                .map_err(|source| operation_error(name, StackOperation::Delete, source))?;
            info!("Stack deleted");
            return Ok(StackOutcome::Deleted);
        }

        Err(ComposeError::Rejected {
            stack: name.to_string(),
            status,
        })
    }

    /// Compute a change set and report it without executing.
    async fn preview(&self, request: &StackRequest, status: &StackStatus) -> Result<StackOutcome> {
        match self.create_change_set(request).await? {
            Some(change_set) => {
                info!(
                    status = %status,
                    link = %change_set.reference(),
                    "Stack will be updated"
                );
                Ok(StackOutcome::Planned(PlannedChange::Update { change_set }))
            }
            None => {
                info!(status = %status, "No change detected");
                Ok(StackOutcome::Planned(PlannedChange::NoChange))
            }
        }
    }

    async fn update_through_change_set(
        &self,
        request: &StackRequest,
        status: &StackStatus,
        progress: &StackProgress,
    ) -> Result<StackOutcome> {
        progress.set_message("computing change set");
        let Some(change_set) = self.create_change_set(request).await? else {
            warn!(status = %status, "Skipping update: change set contains no changes");
            return Ok(StackOutcome::Unchanged);
        };

        info!(link = %change_set.reference(), "Executing change set");
        progress.set_message("executing change set");
        self.client
            .execute_change_set_and_wait(&change_set)
            .await
            .map_err(|source| {
                operation_error(&request.stack_name, StackOperation::ExecuteChangeSet, source)
            })?;
        Ok(StackOutcome::ChangeSetExecuted(change_set))
    }

    /// `Ok(None)` when the change set would be empty
    async fn create_change_set(&self, request: &StackRequest) -> Result<Option<ChangeSetHandle>> {
        let name = change_set_name(&request.stack_name, chrono::Utc::now().timestamp());
        match self.client.create_change_set_and_wait(request, &name).await {
            Ok(handle) => Ok(Some(handle)),
            Err(ClientError::EmptyChangeSet) => Ok(None),
            Err(source) => Err(operation_error(
                &request.stack_name,
                StackOperation::CreateChangeSet,
                source,
            )),
        }
    }
}

fn operation_error(stack: &str, operation: StackOperation, source: ClientError) -> ComposeError {
    ComposeError::Operation {
        stack: stack.to_string(),
        operation,
        source,
    }
}

fn finish(progress: &StackProgress, result: &Result<StackOutcome>) {
    match result {
        Ok(outcome) => progress.finish_success(&outcome.to_string()),
        Err(e) => progress.finish_error(&e.to_string()),
    }
}
