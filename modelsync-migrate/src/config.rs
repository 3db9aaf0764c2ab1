//! Configuration consumed by the comparator and the file manager.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default directory for generated migrations.
pub const DEFAULT_MIGRATIONS_DIR: &str = "db/migrate";

/// Default directory holding model definitions.
pub const DEFAULT_MODELS_DIR: &str = "app/models";

/// Configuration for a comparison run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Path to the migrations directory.
    pub migrations_dir: PathBuf,
    /// Path to the model definitions directory.
    pub models_dir: PathBuf,
    /// Tables never compared.
    pub ignore_tables: BTreeSet<String>,
    /// Model name prefixes never compared (e.g. `Admin::`).
    pub ignore_namespaces: BTreeSet<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            ignore_tables: BTreeSet::new(),
            ignore_namespaces: BTreeSet::new(),
        }
    }
}

impl MigrationConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the migrations directory.
    pub fn migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the models directory.
    pub fn models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Ignore a table.
    pub fn ignore_table(mut self, table: impl Into<String>) -> Self {
        self.ignore_tables.insert(table.into());
        self
    }

    /// Ignore every model whose name starts with `prefix`.
    pub fn ignore_namespace(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_namespaces.insert(prefix.into());
        self
    }

    /// Whether a model name falls under an ignored namespace.
    pub fn is_ignored_namespace(&self, model_name: &str) -> bool {
        self.ignore_namespaces
            .iter()
            .any(|prefix| model_name.starts_with(prefix.as_str()))
    }

    /// Whether a table is ignored.
    pub fn is_ignored_table(&self, table: &str) -> bool {
        self.ignore_tables.contains(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MigrationConfig::default();
        assert_eq!(config.migrations_dir, PathBuf::from("db/migrate"));
        assert_eq!(config.models_dir, PathBuf::from("app/models"));
        assert!(config.ignore_tables.is_empty());
        assert!(config.ignore_namespaces.is_empty());
    }

    #[test]
    fn test_builder_and_predicates() {
        let config = MigrationConfig::new()
            .migrations_dir("test/migrate")
            .ignore_table("sessions")
            .ignore_namespace("Admin::");

        assert_eq!(config.migrations_dir, PathBuf::from("test/migrate"));
        assert!(config.is_ignored_table("sessions"));
        assert!(!config.is_ignored_table("users"));
        assert!(config.is_ignored_namespace("Admin::AuditLog"));
        assert!(!config.is_ignored_namespace("AdminUser"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: MigrationConfig = serde_json::from_str(
            r#"{"ignore_tables": ["ar_internal_metadata"], "ignore_namespaces": ["Legacy"]}"#,
        )
        .unwrap();
        assert_eq!(config.migrations_dir, PathBuf::from(DEFAULT_MIGRATIONS_DIR));
        assert!(config.is_ignored_table("ar_internal_metadata"));
        assert!(config.is_ignored_namespace("LegacyOrder"));
    }
}
