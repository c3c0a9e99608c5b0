pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// Environment variable that points directly at a compose file
pub const CONFIG_ENV_VAR: &str = "STACKFLOW_CONFIG";

/// Directory searched after the current directory
pub const CONFIG_DIR: &str = ".stackflow";

const CANDIDATES: [&str; 3] = ["stackflow.yml", "stackflow.yaml", ".stackflow.yml"];

/// Find the compose file.
///
/// Search order:
/// 1. `explicit` (the `--config` flag); it must exist
/// 2. `STACKFLOW_CONFIG`
/// 3. current directory: stackflow.yml, stackflow.yaml, .stackflow.yml
/// 4. `./.stackflow/` with the same candidates
pub fn find_compose_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::ExplicitFileMissing(path.to_path_buf()));
    }

    if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            return Ok(path);
        }
        tracing::warn!(
            path = %path.display(),
            "{} points at a missing file, falling back to discovery",
            CONFIG_ENV_VAR
        );
    }

    let current_dir = std::env::current_dir()?;
    find_in_dir(&current_dir)
        .or_else(|| find_in_dir(&current_dir.join(CONFIG_DIR)))
        .ok_or(ConfigError::ComposeFileNotFound)
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
