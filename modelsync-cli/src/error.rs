//! CLI error types and result alias.

use miette::Diagnostic;
use modelsync_migrate::MigrationError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(modelsync::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(modelsync::config))]
    Config(String),

    /// Model definition error
    #[error("Model error in {path}: {message}")]
    #[diagnostic(code(modelsync::model))]
    Model {
        /// Definition file
        path: String,
        /// What went wrong
        message: String,
    },

    /// Migration error
    #[error(transparent)]
    #[diagnostic(code(modelsync::migration))]
    Migration(#[from] MigrationError),
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Config(format!("Failed to serialize TOML: {}", err))
    }
}
