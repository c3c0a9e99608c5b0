use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("compose file does not exist: {0}")]
    ExplicitFileMissing(PathBuf),

    #[error(
        "compose file not found. Looked in:\n\
        - current directory: stackflow.yml, stackflow.yaml, .stackflow.yml\n\
        - ./.stackflow/ directory\n\
        Pass --config or set STACKFLOW_CONFIG to point at it directly"
    )]
    ComposeFileNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
