//! CLI error types.

use partials_config::ConfigError;
use partials_directives::ResolveError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{failed} of {total} documents failed")]
    CheckFailed { failed: usize, total: usize },
}
