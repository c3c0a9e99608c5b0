//! Input for create/update/changeset calls

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the control plane reads the template from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateBody {
    /// Inline template document
    Body(String),
    /// Template already uploaded to object storage
    Url(String),
}

/// Everything a mutating call needs to know about one stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRequest {
    pub stack_name: String,
    pub template: TemplateBody,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Create-only; the control plane ignores it on update
    #[serde(default)]
    pub timeout_in_minutes: Option<u32>,
}

impl StackRequest {
    pub fn new(stack_name: impl Into<String>, template: TemplateBody) -> Self {
        Self {
            stack_name: stack_name.into(),
            template,
            capabilities: Vec::new(),
            parameters: BTreeMap::new(),
            tags: BTreeMap::new(),
            timeout_in_minutes: None,
        }
    }
}
