//! Template expansion
//!
//! Compose files are rendered with Tera before they are parsed. Besides the
//! declared variables, templates can call `shell(cmd="...", args=[...])`,
//! which runs a binary and substitutes its trimmed stdout.

use crate::error::{FlowError, Result};
use std::collections::{BTreeMap, HashMap};
use std::process::Command;
use tera::{Context, Tera, Value};
use tracing::{debug, info};

/// Variable bindings, name to value
pub type Variables = BTreeMap<String, String>;

/// Template processor
pub struct TemplateProcessor {
    tera: Tera,
    context: Context,
}

impl TemplateProcessor {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.register_function("shell", shell_function);
        Self {
            tera,
            context: Context::new(),
        }
    }

    pub fn add_variables(&mut self, variables: &Variables) {
        for (key, value) in variables {
            self.context.insert(key.as_str(), value);
        }
    }

    /// Expose every process environment variable to templates.
    #[tracing::instrument(skip(self))]
    pub fn add_env_variables(&mut self) {
        let mut count = 0;
        for (key, value) in std::env::vars() {
            self.context.insert(key, &value);
            count += 1;
        }
        debug!(env_var_count = count, "Added environment variables");
    }

    /// Render the declared variables, then let the environment override them.
    ///
    /// Declared values see the environment and `shell()`, but not each other.
    pub fn resolve_variables(&mut self, declared: &Variables) -> Result<Variables> {
        let mut resolved = Variables::new();
        for (key, raw) in declared {
            let value = self.render_str(raw).map_err(|e| match e {
                FlowError::TemplateRenderError(message) => {
                    FlowError::TemplateRenderError(format!("variable `{key}`: {message}"))
                }
                other => other,
            })?;
            resolved.insert(key.clone(), value);
        }

        let overridden = overlay_env(&mut resolved);
        info!(
            variable_count = resolved.len(),
            env_overrides = overridden,
            "Resolved compose variables"
        );
        Ok(resolved)
    }

    /// Render a string as a template
    pub fn render_str(&mut self, template: &str) -> Result<String> {
        self.tera
            .render_str(template, &self.context)
            .map_err(|e| FlowError::TemplateRenderError(extract_tera_error_detail(&e)))
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace declared variables that are also set in the environment.
///
/// Returns how many values were replaced.
pub fn overlay_env(vars: &mut Variables) -> usize {
    let mut count = 0;
    for (key, value) in vars.iter_mut() {
        if let Ok(env_value) = std::env::var(key) {
            debug!(key = %key, "Variable overridden by environment");
            *value = env_value;
            count += 1;
        }
    }
    count
}

/// `shell(cmd="git", args=["rev-parse", "HEAD"])`
fn shell_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let bin = args
        .get("cmd")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| tera::Error::msg("shell() requires a non-empty `cmd` argument"))?;

    let cmd_args: Vec<String> = match args.get("args") {
        None => Vec::new(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(_) => return Err(tera::Error::msg("shell() `args` must be a list of strings")),
    };

    let stdout = run_shell(bin, &cmd_args).map_err(|e| tera::Error::msg(e.to_string()))?;
    Ok(Value::String(stdout))
}

fn run_shell(bin: &str, args: &[String]) -> Result<String> {
    debug!("Running: {} {}", bin, args.join(" "));
    let command = format!("{} {}", bin, args.join(" ")).trim().to_string();

    let output = Command::new(bin)
        .args(args)
        .output()
        .map_err(|e| FlowError::Shell {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(FlowError::Shell {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Collect the Tera error chain into one readable message
fn extract_tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }

    let full_error = details.join(" | ");

    if full_error.contains("not found in context")
        && let Some(start) = full_error.find("Variable `")
        && let Some(end) = full_error[start..].find("` not found")
    {
        let var_name = &full_error[start + 10..start + end];
        return format!(
            "undefined variable: `{}`\nhint: declare it under `vars` or export it in the environment",
            var_name
        );
    }

    full_error
}
