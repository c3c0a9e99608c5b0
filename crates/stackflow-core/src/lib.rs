//! stackflow core
//!
//! The validated, in-memory compose configuration: flows, their ordering and
//! the stacks they contain, plus the loader that turns a templated YAML file
//! into that model.

pub mod error;
pub mod loader;
pub mod model;
pub mod template;

pub use error::{FlowError, Result};
pub use loader::{load_compose_file, parse_compose_str};
pub use model::*;
pub use template::{TemplateProcessor, Variables};
