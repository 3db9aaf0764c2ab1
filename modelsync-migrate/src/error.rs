//! Error types for the schema comparator and migration builder.

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur while comparing schemas or generating migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A declared field type is not valid for the active store family.
    #[error(
        "Invalid field type: {ty} for {family} (field '{field}').\nValid types are: {}",
        .valid.join(", ")
    )]
    InvalidFieldType {
        /// Field name.
        field: String,
        /// The rejected type.
        ty: String,
        /// Store family the type was validated against.
        family: String,
        /// Types accepted by that family.
        valid: Vec<String>,
    },

    /// Migration files exist that the store has not applied yet.
    #[error("Pending migrations detected: {}", .0.join(", "))]
    PendingMigrations(Vec<String>),

    /// A single introspection call failed.
    #[error("Introspection failed: {0}")]
    Introspection(String),

    /// No store could be reached at all.
    #[error("No store connection: {0}")]
    NoStoreConnection(String),

    /// Invalid migration file or format.
    #[error("Invalid migration: {0}")]
    InvalidMigration(String),

    /// Invalid model definition or configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rendering a migration unit failed.
    #[error("Render error: {0}")]
    Render(String),

    /// No changes to migrate.
    #[error("No schema changes detected")]
    NoChanges,
}

impl MigrationError {
    /// Create an introspection error.
    pub fn introspection(msg: impl Into<String>) -> Self {
        Self::Introspection(msg.into())
    }

    /// Create a no-store-connection error.
    pub fn no_store_connection(msg: impl Into<String>) -> Self {
        Self::NoStoreConnection(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create a migration file error.
    pub fn migration_file(msg: impl Into<String>) -> Self {
        Self::InvalidMigration(msg.into())
    }

    /// Check if this error should be degraded rather than halt the run.
    ///
    /// Only pending migrations and invalid field types stop the process.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Introspection(_) | Self::NoStoreConnection(_) | Self::NoChanges
        )
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for MigrationError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Introspection(err.to_string())
    }
}
