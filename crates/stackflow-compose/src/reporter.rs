//! Per-stack progress spinners
//!
//! Spinners tick on their own thread and never influence scheduling.

use crate::context::ExecutionContext;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(120);

/// Progress output shared by every worker
#[derive(Clone, Default)]
pub struct Reporter {
    multi: Option<MultiProgress>,
}

impl Reporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: enabled.then(MultiProgress::new),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.multi.is_some()
    }

    pub fn start(&self, ctx: &ExecutionContext, message: &str) -> StackProgress {
        let Some(multi) = &self.multi else {
            return StackProgress {
                bar: None,
                label: ctx.label(),
            };
        };

        let pb = multi.add(ProgressBar::new_spinner());
        let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(TICK);

        let label = ctx.label();
        pb.set_message(format!("{} {}", label, message));
        StackProgress {
            bar: Some(pb),
            label,
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// One stack's spinner
pub struct StackProgress {
    bar: Option<ProgressBar>,
    label: String,
}

impl StackProgress {
    pub fn set_message(&self, msg: &str) {
        if let Some(pb) = &self.bar {
            pb.set_message(format!("{} {}", self.label, msg));
        }
    }

    pub fn finish_success(&self, msg: &str) {
        if let Some(pb) = &self.bar {
            pb.finish_with_message(format!("{} {} ✓", self.label, msg));
        }
    }

    pub fn finish_error(&self, error: &str) {
        if let Some(pb) = &self.bar {
            pb.abandon_with_message(format!("{} failed: {}", self.label, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_reporter_is_noop() {
        let reporter = Reporter::silent();
        assert!(!reporter.is_enabled());

        let progress = reporter.start(&ExecutionContext::for_flow("f", 0).for_stack("s"), "working");
        progress.set_message("still working");
        progress.finish_success("done");
        progress.finish_error("boom");
    }

    #[test]
    fn test_enabled_reporter_creates_spinner() {
        let reporter = Reporter::new(true);
        assert!(reporter.is_enabled());

        let progress = reporter.start(&ExecutionContext::for_flow("f", 0).for_stack("s"), "working");
        assert!(progress.bar.is_some());
        progress.finish_success("done");
    }
}
