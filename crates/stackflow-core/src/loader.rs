//! Compose file loader
//!
//! Ties together variable resolution, template expansion and YAML parsing.

use crate::error::{FlowError, Result};
use crate::model::ComposeConfig;
use crate::template::{TemplateProcessor, Variables};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Only the `vars` block, read before anything is rendered
#[derive(Debug, Default, Deserialize)]
struct VarsSection {
    #[serde(default)]
    vars: Variables,
}

/// Load a compose file from disk.
///
/// 1. Resolve the `vars` block (`shell()` allowed, environment overrides)
/// 2. Render the whole document with the resolved variables
/// 3. Parse YAML, promote flow keys to names
/// 4. Resolve relative `template_file` paths against the compose file directory
///
/// The result is not validated; call [`ComposeConfig::validate`].
#[instrument(fields(path = %path.display()))]
pub fn load_compose_file(path: &Path) -> Result<ComposeConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FlowError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    parse_compose_str(&content, base_dir).map_err(|e| match e {
        FlowError::TemplateRenderError(message) => FlowError::TemplateError {
            file: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse compose content; relative template paths are joined onto `base_dir`.
pub fn parse_compose_str(content: &str, base_dir: &Path) -> Result<ComposeConfig> {
    if content.trim().is_empty() {
        return Err(FlowError::InvalidConfig(
            "compose file is empty".to_string(),
        ));
    }

    debug!("Step 1: Resolving variables");
    let section: VarsSection = serde_yaml::from_str(content)?;
    let mut processor = TemplateProcessor::new();
    processor.add_env_variables();
    let vars = processor.resolve_variables(&section.vars)?;
    processor.add_variables(&vars);

    debug!("Step 2: Expanding templates");
    let rendered = processor.render_str(content)?;

    debug!("Step 3: Parsing YAML");
    let mut config: ComposeConfig = serde_yaml::from_str(&rendered)?;
    config.vars = vars;
    config.assign_flow_names();

    debug!("Step 4: Resolving template paths");
    resolve_template_paths(&mut config, base_dir);

    info!(
        flows = config.flows.len(),
        stacks = config.stack_count(),
        "Compose file loaded"
    );
    Ok(config)
}

fn resolve_template_paths(config: &mut ComposeConfig, base_dir: &Path) {
    for flow in config.flows.values_mut() {
        for stack in flow.stacks.iter_mut() {
            if let Some(file) = stack.template_file.as_mut()
                && !file.as_os_str().is_empty()
                && file.is_relative()
            {
                *file = base_dir.join(&*file);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const COMPOSE: &str = r#"
description: test compose
vars:
  ENV_NAME: dev
flows:
  network:
    description: base network
    order: 0
    stacks:
      - stack_name: "{{ ENV_NAME }}-vpc"
        template_file: templates/vpc.yml
        parameters:
          Env: "{{ ENV_NAME }}"
  app:
    order: 1
    stacks:
      - stack_name: "{{ ENV_NAME }}-app"
        template_url: https://example.com/app.yml
        capabilities: [CAPABILITY_IAM]
"#;

    #[test]
    #[serial]
    fn test_load_compose_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stackflow.yml");
        fs::write(&path, COMPOSE).unwrap();

        let config = load_compose_file(&path).unwrap();
        assert_eq!(config.description, "test compose");
        assert_eq!(config.flows.len(), 2);
        assert!(config.validate().is_ok());

        let network = &config.flows["network"];
        assert_eq!(network.name, "network");
        assert_eq!(network.order, 0);
        assert_eq!(network.stacks[0].stack_name, "dev-vpc");
        assert_eq!(network.stacks[0].parameters["Env"], "dev");
        assert_eq!(
            network.stacks[0].template_file.as_deref(),
            Some(dir.path().join("templates/vpc.yml").as_path())
        );

        let app = &config.flows["app"];
        assert_eq!(app.stacks[0].stack_name, "dev-app");
        assert_eq!(
            app.stacks[0].template_url.as_deref(),
            Some("https://example.com/app.yml")
        );
        assert_eq!(config.vars["ENV_NAME"], "dev");
    }

    #[test]
    #[serial]
    fn test_environment_overrides_vars_before_rendering() {
        temp_env::with_var("ENV_NAME", Some("prod"), || {
            let config = parse_compose_str(COMPOSE, Path::new("/project")).unwrap();
            assert_eq!(config.vars["ENV_NAME"], "prod");
            assert_eq!(config.flows["app"].stacks[0].stack_name, "prod-app");
        });
    }

    #[test]
    fn test_absolute_template_paths_are_kept() {
        let content = r#"
flows:
  only:
    stacks:
      - stack_name: s
        template_file: /abs/t.yml
"#;
        let config = parse_compose_str(content, Path::new("/project")).unwrap();
        assert_eq!(
            config.flows["only"].stacks[0].template_file.as_deref(),
            Some(Path::new("/abs/t.yml"))
        );
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let err = parse_compose_str("   \n", Path::new(".")).unwrap_err();
        assert!(matches!(err, FlowError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let err = parse_compose_str("flows: [unclosed", Path::new(".")).unwrap_err();
        assert!(matches!(err, FlowError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_compose_file(Path::new("/definitely/not/here.yml")).unwrap_err();
        assert!(matches!(err, FlowError::IoError { .. }));
    }

    #[test]
    fn test_undefined_variable_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stackflow.yml");
        fs::write(
            &path,
            "flows:\n  a:\n    stacks:\n      - stack_name: \"{{ STACKFLOW_NOT_DEFINED_ANYWHERE }}\"\n",
        )
        .unwrap();

        let err = load_compose_file(&path).unwrap_err();
        assert!(matches!(err, FlowError::TemplateError { .. }));
    }
}
