//! Worker pool and scheduler
//!
//! A fixed set of workers pulls flow tasks from one shared queue. The
//! scheduler dispatches a whole order level, waits for every result of that
//! level, and only then moves on. The first failure cancels the pool and no
//! further level is dispatched.

use crate::error::{ComposeError, Result};
use crate::flow::{FlowReport, RunMode, execute_flow};
use crate::lifecycle::StackLifecycle;
use crate::plan::ExecutionPlan;
use crate::reporter::Reporter;
use stackflow_cloud::StackClient;
use stackflow_core::Flow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default wait for in-flight flows after a failure
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Number of workers for a run.
///
/// A request of zero or less means "unset" and yields one worker per flow;
/// otherwise the request is capped at the flow count.
pub fn worker_count(flows: usize, requested: i64) -> usize {
    match usize::try_from(requested) {
        Ok(requested) if requested > 0 => requested.min(flows),
        _ => flows,
    }
}

#[derive(Debug, Clone)]
pub struct ComposerOptions {
    pub dry_run: bool,
    /// Worker override; zero or negative means unset
    pub workers: i64,
    pub grace_period: Duration,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            workers: 0,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

/// One flow to execute
#[derive(Debug, Clone)]
struct FlowTask {
    flow: Arc<Flow>,
    mode: RunMode,
    dry_run: bool,
}

/// Result of one task, tagged with its flow
#[derive(Debug)]
struct FlowResult {
    flow: String,
    outcome: Result<FlowReport>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Flow reports in completion order
    pub flows: Vec<FlowReport>,
}

impl RunReport {
    pub fn stack_count(&self) -> usize {
        self.flows.iter().map(|f| f.stacks.len()).sum()
    }
}

/// Runs an [`ExecutionPlan`] over a worker pool
pub struct Composer {
    lifecycle: StackLifecycle,
    options: ComposerOptions,
}

impl Composer {
    pub fn new(client: Arc<dyn StackClient>, reporter: Reporter, options: ComposerOptions) -> Self {
        Self {
            lifecycle: StackLifecycle::new(client, reporter),
            options,
        }
    }

    /// Execute every level of `plan`.
    ///
    /// Returns the first flow failure. Flows of the failed level that were
    /// already running get `grace_period` to finish before this returns.
    pub async fn run(&self, plan: &ExecutionPlan) -> Result<RunReport> {
        if plan.is_empty() {
            return Ok(RunReport::default());
        }

        let workers = worker_count(plan.flow_count(), self.options.workers);
        let (task_tx, task_rx) = mpsc::channel::<FlowTask>(workers);
        let (result_tx, mut result_rx) = mpsc::channel::<FlowResult>(plan.flow_count());
        let task_rx = Arc::new(Mutex::new(task_rx));
        let cancel = CancellationToken::new();

        info!(
            mode = %plan.mode(),
            dry_run = self.options.dry_run,
            workers,
            levels = plan.levels().len(),
            "Starting run"
        );

        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(worker(
                id,
                task_rx.clone(),
                result_tx.clone(),
                self.lifecycle.clone(),
                cancel.clone(),
            ));
        }
        drop(result_tx);

        let mut report = RunReport::default();
        for level in plan.levels() {
            info!(order = level.order, flows = level.flows.len(), "Dispatching order level");

            let mut dispatched = 0;
            for flow in level.flows.iter().filter_map(|&i| plan.flow(i)) {
                let task = FlowTask {
                    flow: flow.clone(),
                    mode: plan.mode(),
                    dry_run: self.options.dry_run,
                };
                if task_tx.send(task).await.is_err() {
                    cancel.cancel();
                    return Err(ComposeError::WorkerPool(
                        "task queue closed before dispatch".to_string(),
                    ));
                }
                dispatched += 1;
            }

            for _ in 0..dispatched {
                let Some(result) = result_rx.recv().await else {
                    cancel.cancel();
                    return Err(ComposeError::WorkerPool(
                        "all workers exited before reporting".to_string(),
                    ));
                };

                match result.outcome {
                    Ok(flow_report) => {
                        debug!(flow = %result.flow, "Flow reported success");
                        report.flows.push(flow_report);
                    }
                    Err(e) => {
                        error!(flow = %result.flow, order = level.order, "Flow failed: {}", e);
                        cancel.cancel();
                        drop(task_tx);
                        self.drain(pool).await;
                        return Err(e);
                    }
                }
            }

            info!(order = level.order, "Order level complete");
        }

        cancel.cancel();
        drop(task_tx);
        while pool.join_next().await.is_some() {}

        info!(
            flows = report.flows.len(),
            stacks = report.stack_count(),
            "Run complete"
        );
        Ok(report)
    }

    /// Wait up to the grace period for busy workers, then leave them running.
    async fn drain(&self, mut pool: JoinSet<()>) {
        let grace = self.options.grace_period;
        let drained = tokio::time::timeout(grace, async {
            while pool.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                grace_period = ?grace,
                busy = pool.len(),
                "Workers still busy after grace period; in-flight stacks are left to finish"
            );
            pool.detach_all();
        }
    }
}

async fn worker(
    id: usize,
    tasks: Arc<Mutex<mpsc::Receiver<FlowTask>>>,
    results: mpsc::Sender<FlowResult>,
    lifecycle: StackLifecycle,
    cancel: CancellationToken,
) {
    debug!(worker = id, "Worker started");
    loop {
        let task = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            task = async { tasks.lock().await.recv().await } => task,
        };
        let Some(task) = task else { break };

        let outcome = execute_flow(&lifecycle, &task.flow, task.mode, task.dry_run, &cancel).await;
        let result = FlowResult {
            flow: task.flow.name.clone(),
            outcome,
        };
        if results.send(result).await.is_err() {
            break;
        }
    }
    debug!(worker = id, "Worker stopped");
}
