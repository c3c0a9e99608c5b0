//! Stack definition

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A named unit of remote infrastructure, created, updated and deleted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    /// Name of the stack in the control plane
    pub stack_name: String,

    /// Local template file. Relative paths are resolved against the compose file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<PathBuf>,

    /// Remote template location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    /// Creation timeout in minutes
    #[serde(default, rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_in_minutes: Option<u32>,

    /// Route non dry-run updates through a changeset
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enable_change_set: bool,
}

/// Where the template body comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource<'a> {
    File(&'a Path),
    Url(&'a str),
}

impl Stack {
    pub fn new(stack_name: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            ..Default::default()
        }
    }

    pub fn with_template_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_file = Some(path.into());
        self
    }

    pub fn with_template_url(mut self, url: impl Into<String>) -> Self {
        self.template_url = Some(url.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// The configured template source, if exactly one is set.
    ///
    /// Empty strings count as unset, the same way validation treats them.
    pub fn template_source(&self) -> Option<TemplateSource<'_>> {
        let file = self
            .template_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty());
        let url = self.template_url.as_deref().filter(|u| !u.is_empty());

        match (file, url) {
            (Some(file), None) => Some(TemplateSource::File(file)),
            (None, Some(url)) => Some(TemplateSource::Url(url)),
            _ => None,
        }
    }

    /// Validate a stack that sits at `index` inside `flow`.
    pub fn validate(&self, flow: &str, index: usize) -> Result<()> {
        if self.stack_name.trim().is_empty() {
            return Err(FlowError::EmptyStackName {
                flow: flow.to_string(),
                index,
            });
        }

        let has_file = self
            .template_file
            .as_deref()
            .is_some_and(|p| !p.as_os_str().is_empty());
        let has_url = self.template_url.as_deref().is_some_and(|u| !u.is_empty());

        match (has_file, has_url) {
            (false, false) => Err(FlowError::MissingTemplate {
                flow: flow.to_string(),
                index,
            }),
            (true, true) => Err(FlowError::ConflictingTemplate {
                flow: flow.to_string(),
                index,
            }),
            _ => Ok(()),
        }
    }
}
