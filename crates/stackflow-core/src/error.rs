use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {path}\nreason: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("flow count is {count}, the compose file should have between 1 and {max} flows")]
    FlowCount { count: usize, max: usize },

    #[error("[FLOW: {flow}] stack count is {count}, should be between 1 and {max}")]
    StackCount {
        flow: String,
        count: usize,
        max: usize,
    },

    #[error("[FLOW: {flow}] order should be within {min}-{max}, found: {order}")]
    OrderOutOfRange {
        flow: String,
        order: i64,
        min: i64,
        max: i64,
    },

    #[error("[FLOW: {flow}] stack_name for the stack at index {index} is empty")]
    EmptyStackName { flow: String, index: usize },

    #[error(
        "[FLOW: {flow}] one of 'template_file' or 'template_url' must be set for the stack at index {index}"
    )]
    MissingTemplate { flow: String, index: usize },

    #[error(
        "[FLOW: {flow}] 'template_file' and 'template_url' are mutually exclusive (stack at index {index})"
    )]
    ConflictingTemplate { flow: String, index: usize },

    #[error("template error: {file}\nreason: {message}")]
    TemplateError { file: PathBuf, message: String },

    #[error("template render error: {0}")]
    TemplateRenderError(String),

    #[error("shell command `{command}` failed: {message}")]
    Shell { command: String, message: String },

    #[error("stack_name {stack} is declared more than once (flows: {})", flows.join(", "))]
    DuplicateStackName { stack: String, flows: Vec<String> },
}

pub type Result<T> = std::result::Result<T, FlowError>;
