//! CLI error types.

use img2fig_config::ConfigError;
use img2fig_renderer::RewriteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Rewrite(#[from] RewriteError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {source}")]
    Input {
        path: String,
        source: std::io::Error,
    },
}
