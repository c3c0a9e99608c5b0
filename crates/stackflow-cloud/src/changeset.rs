//! Change set handle

use serde::{Deserialize, Serialize};

/// A computed, not yet executed, change set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSetHandle {
    pub stack_name: String,
    pub change_set_name: String,
    /// Control-plane id (ARN for CloudFormation)
    pub id: String,
    pub stack_id: String,
    /// Console link a human can follow to review the change set
    pub link: Option<String>,
}

impl ChangeSetHandle {
    /// Link if the adapter built one, otherwise the change set id
    pub fn reference(&self) -> &str {
        self.link.as_deref().unwrap_or(&self.id)
    }
}

/// `<stack>-<unix timestamp>`, unique across repeated dry-runs
pub fn change_set_name(stack_name: &str, unix_timestamp: i64) -> String {
    format!("{}-{}", stack_name, unix_timestamp)
}
