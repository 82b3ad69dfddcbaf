use std::path::PathBuf;
use thiserror::Error;
use troupe::config::ConfigError;

/// Errors that end a CLI command before it produces output.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("{} already exists, pass --force to overwrite", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}
