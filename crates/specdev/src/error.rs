//! CLI error types.

use std::path::PathBuf;

use specdev_config::ConfigError;
use specdev_server::ServerError;
use specdev_watch::WatchError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error(
        "spec file not found: {} (create it or point --spec-file at your OpenAPI document)",
        .0.display()
    )]
    SpecFileMissing(PathBuf),

    #[error("{0}")]
    Watch(#[from] WatchError),

    #[error("{0}")]
    Server(#[from] ServerError),
}
