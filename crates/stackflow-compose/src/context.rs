//! Execution context
//!
//! Identifies the flow, order and stack being worked on. Passed explicitly
//! down the call chain and attached to every log line as span fields.

use tracing::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub flow: String,
    pub order: i64,
    pub stack: Option<String>,
}

impl ExecutionContext {
    pub fn for_flow(flow: impl Into<String>, order: i64) -> Self {
        Self {
            flow: flow.into(),
            order,
            stack: None,
        }
    }

    /// Same flow and order, narrowed to one stack
    pub fn for_stack(&self, stack: impl Into<String>) -> Self {
        Self {
            flow: self.flow.clone(),
            order: self.order,
            stack: Some(stack.into()),
        }
    }

    pub fn stack_name(&self) -> &str {
        self.stack.as_deref().unwrap_or("-")
    }

    pub fn span(&self) -> Span {
        tracing::info_span!(
            "stack",
            flow = %self.flow,
            order = self.order,
            stack = %self.stack_name()
        )
    }

    /// Prefix for human-facing progress lines
    pub fn label(&self) -> String {
        match &self.stack {
            Some(stack) => format!("[{}] {}", self.flow, stack),
            None => format!("[{}]", self.flow),
        }
    }
}
