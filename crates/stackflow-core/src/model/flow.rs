//! Flow definition

use super::stack::Stack;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on stacks inside one flow
pub const MAX_STACKS_PER_FLOW: usize = 30;

/// Smallest allowed order key
pub const MIN_ORDER: i64 = 0;

/// Largest allowed order key
pub const MAX_ORDER: i64 = 100;

/// Flow - one deployable unit
///
/// A named, ordered list of stacks sharing one scheduling order key.
/// The stack sequence is the execution order; destroy walks it backwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    /// Promoted from the `flows` map key after parsing
    #[serde(default, skip_serializing)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Flows sharing an order run concurrently
    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub stacks: Vec<Stack>,
}

impl Flow {
    pub fn new(name: impl Into<String>, order: i64, stacks: Vec<Stack>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            order,
            stacks,
        }
    }

    /// Validate stack count, order range and every contained stack.
    pub fn validate(&self) -> Result<()> {
        let count = self.stacks.len();
        if count == 0 || count > MAX_STACKS_PER_FLOW {
            return Err(FlowError::StackCount {
                flow: self.name.clone(),
                count,
                max: MAX_STACKS_PER_FLOW,
            });
        }

        if !(MIN_ORDER..=MAX_ORDER).contains(&self.order) {
            return Err(FlowError::OrderOutOfRange {
                flow: self.name.clone(),
                order: self.order,
                min: MIN_ORDER,
                max: MAX_ORDER,
            });
        }

        for (index, stack) in self.stacks.iter().enumerate() {
            stack.validate(&self.name, index)?;
        }

        Ok(())
    }

    /// Stacks in teardown order
    pub fn reversed_stacks(&self) -> Vec<&Stack> {
        self.stacks.iter().rev().collect()
    }
}
