//! stackflow orchestration
//!
//! Groups flows into order levels, runs each level concurrently on a bounded
//! worker pool, and drives every stack through its lifecycle:
//!
//! ```text
//! ExecutionPlan ──▶ Composer ──▶ worker ──▶ execute_flow ──▶ StackLifecycle ──▶ StackClient
//!  (levels)        (barrier,     (pool)     (sequential     (status decision)
//!                   cancel)                  stacks)
//! ```

pub mod context;
pub mod error;
pub mod flow;
pub mod lifecycle;
pub mod plan;
pub mod reporter;
pub mod request;
pub mod scheduler;

pub use context::ExecutionContext;
pub use error::{ComposeError, Result, StackOperation};
pub use flow::{FlowReport, RunMode, StackReport, execute_flow};
pub use lifecycle::{PlannedChange, StackLifecycle, StackOutcome};
pub use plan::{ExecutionPlan, PlanLevel};
pub use reporter::{Reporter, StackProgress};
pub use request::build_request;
pub use scheduler::{Composer, ComposerOptions, DEFAULT_GRACE_PERIOD, RunReport, worker_count};
