//! Execution plan
//!
//! Flows partitioned by order key into levels, built once per run from a
//! validated configuration. Deploy walks levels ascending, destroy descending.

use crate::error::{ComposeError, Result};
use crate::flow::RunMode;
use stackflow_core::{ComposeConfig, Flow};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Flows sharing one order key; they run concurrently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLevel {
    pub order: i64,
    /// Indices into [`ExecutionPlan::flows`]
    pub flows: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    mode: RunMode,
    flows: Vec<Arc<Flow>>,
    levels: Vec<PlanLevel>,
}

impl ExecutionPlan {
    /// Plan every flow in `config`.
    pub fn new(config: &ComposeConfig, mode: RunMode) -> Self {
        let flows: Vec<Arc<Flow>> = config.flows.values().cloned().map(Arc::new).collect();

        let mut by_order: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (index, flow) in flows.iter().enumerate() {
            by_order.entry(flow.order).or_default().push(index);
        }

        let mut levels: Vec<PlanLevel> = by_order
            .into_iter()
            .map(|(order, flows)| PlanLevel { order, flows })
            .collect();
        if mode == RunMode::Destroy {
            levels.reverse();
        }

        Self {
            mode,
            flows,
            levels,
        }
    }

    /// Plan a single named flow as the only level.
    pub fn cherry_pick(config: &ComposeConfig, flow_name: &str, mode: RunMode) -> Result<Self> {
        let flow = config
            .flows
            .get(flow_name)
            .ok_or_else(|| ComposeError::FlowNotFound(flow_name.to_string()))?;

        Ok(Self {
            mode,
            levels: vec![PlanLevel {
                order: flow.order,
                flows: vec![0],
            }],
            flows: vec![Arc::new(flow.clone())],
        })
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn levels(&self) -> &[PlanLevel] {
        &self.levels
    }

    pub fn flow(&self, index: usize) -> Option<&Arc<Flow>> {
        self.flows.get(index)
    }

    /// Number of flows that will be scheduled
    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Human-readable view of the plan, levels in execution order
    pub fn visualize(&self) -> String {
        let mut out = String::new();
        for level in &self.levels {
            let _ = writeln!(out, "Order {}:", level.order);
            for flow in level.flows.iter().filter_map(|&i| self.flows.get(i)) {
                if flow.description.is_empty() {
                    let _ = writeln!(out, "  - {}", flow.name);
                } else {
                    let _ = writeln!(out, "  - {} ({})", flow.name, flow.description);
                }

                let stacks = match self.mode {
                    RunMode::Deploy => flow.stacks.iter().collect::<Vec<_>>(),
                    RunMode::Destroy => flow.reversed_stacks(),
                };
                for (position, stack) in stacks.iter().enumerate() {
                    let _ = writeln!(out, "      {}. {}", position + 1, stack.stack_name);
                }
            }
        }
        out
    }
}
