//! Error types for the Tabula CLI.

use tabula_session::SessionError;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Session store error
    #[error("{0}")]
    Session(#[from] SessionError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Destructive command issued without `--force`
    #[error("Refusing to {0} without --force")]
    NotForced(String),

    /// Output formatting error
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
