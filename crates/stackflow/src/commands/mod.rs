pub mod config;
pub mod run;

use stackflow_core::ComposeConfig;
use std::path::Path;

/// Load, render and validate the compose file
pub fn load(path: &Path) -> anyhow::Result<ComposeConfig> {
    let config = stackflow_core::load_compose_file(path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid compose file {}: {e}", path.display()))?;
    Ok(config)
}
