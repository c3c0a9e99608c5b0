//! Flow executor
//!
//! Runs one flow's stacks strictly in sequence, forward for deploy and in
//! reverse for destroy, and stops at the first failure.

use crate::context::ExecutionContext;
use crate::error::{ComposeError, Result};
use crate::lifecycle::{StackLifecycle, StackOutcome};
use stackflow_core::Flow;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span};

/// Direction of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Deploy,
    Destroy,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Deploy => write!(f, "deploy"),
            RunMode::Destroy => write!(f, "destroy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackReport {
    pub stack: String,
    pub outcome: StackOutcome,
}

/// Per-stack outcomes of one successful flow, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReport {
    pub flow: String,
    pub order: i64,
    pub stacks: Vec<StackReport>,
}

/// Execute one flow.
///
/// The cancellation token is checked before each stack; a stack already in
/// progress always runs to completion.
pub async fn execute_flow(
    lifecycle: &StackLifecycle,
    flow: &Flow,
    mode: RunMode,
    dry_run: bool,
    cancel: &CancellationToken,
) -> Result<FlowReport> {
    let span = info_span!("flow", flow = %flow.name, order = flow.order, %mode, dry_run);
    run_stacks(lifecycle, flow, mode, dry_run, cancel)
        .instrument(span)
        .await
}

async fn run_stacks(
    lifecycle: &StackLifecycle,
    flow: &Flow,
    mode: RunMode,
    dry_run: bool,
    cancel: &CancellationToken,
) -> Result<FlowReport> {
    let ctx = ExecutionContext::for_flow(&flow.name, flow.order);
    let stacks = match mode {
        RunMode::Deploy => flow.stacks.iter().collect::<Vec<_>>(),
        RunMode::Destroy => flow.reversed_stacks(),
    };

    info!(stacks = stacks.len(), "Running flow");
    let mut report = FlowReport {
        flow: flow.name.clone(),
        order: flow.order,
        stacks: Vec::with_capacity(stacks.len()),
    };

    for stack in stacks {
        let name = &stack.stack_name;
        if cancel.is_cancelled() {
            return Err(ComposeError::Cancelled {
                flow: flow.name.clone(),
                stack: name.clone(),
            });
        }

        let stack_ctx = ctx.for_stack(name);
        let result = match mode {
            RunMode::Deploy => lifecycle.apply(&stack_ctx, stack, dry_run).await,
            RunMode::Destroy => lifecycle.destroy(&stack_ctx, stack, dry_run).await,
        };

        match result {
            Ok(outcome) => report.stacks.push(StackReport {
                stack: name.clone(),
                outcome,
            }),
            Err(source) => {
                return Err(ComposeError::Flow {
                    flow: flow.name.clone(),
                    stack: name.clone(),
                    source: Box::new(source),
                });
            }
        }
    }

    info!("Flow finished");
    Ok(report)
}
