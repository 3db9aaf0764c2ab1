//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use modelsync_migrate::config::{DEFAULT_MIGRATIONS_DIR, DEFAULT_MODELS_DIR};
use modelsync_migrate::{MigrationConfig, RenderFormat, StoreFamily};

use crate::error::{CliError, CliResult};

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "modelsync.toml";

/// modelsync CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Migration configuration
    pub migrations: MigrationsConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::Config(format!(
                "{} not found. Run `modelsync init` first.",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create a default config for a specific provider
    pub fn default_for_provider(provider: &str) -> Self {
        let mut config = Self::default();
        config.database.provider = provider.to_string();
        config
    }

    /// Store family named by the provider
    pub fn family(&self) -> StoreFamily {
        StoreFamily::from_provider(&self.database.provider)
    }

    /// Comparator configuration, with directories resolved against `root`
    pub fn migration_config(&self, root: &Path) -> MigrationConfig {
        let migrations = &self.migrations;
        MigrationConfig {
            migrations_dir: root.join(&migrations.migrations_dir),
            models_dir: root.join(&migrations.models_dir),
            ignore_tables: migrations.ignore_tables.clone(),
            ignore_namespaces: migrations.ignore_namespaces.clone(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database provider (postgresql, mysql, sqlite)
    pub provider: String,

    /// Database connection URL
    pub url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            url: None,
        }
    }
}

/// Migration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    /// Directory for migration files
    pub migrations_dir: PathBuf,

    /// Directory holding model definition files
    pub models_dir: PathBuf,

    /// Tables that are never compared
    pub ignore_tables: BTreeSet<String>,

    /// Model name prefixes that are never compared
    pub ignore_namespaces: BTreeSet<String>,

    /// Output format of generated migrations (sql, json)
    pub format: RenderFormat,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            ignore_tables: BTreeSet::new(),
            ignore_namespaces: BTreeSet::new(),
            format: RenderFormat::default(),
        }
    }
}
