//! Migration file management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};
use crate::operation::MigrationUnit;
use crate::render::MigrationRenderer;

/// A migration file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFile {
    /// Path to the migration file.
    pub path: PathBuf,
    /// Version prefix (the generation timestamp).
    pub version: String,
    /// Migration name (everything after the version).
    pub name: String,
}

impl MigrationFile {
    /// Parse a `<version>_<name>.<ext>` path.
    pub fn from_path(path: impl Into<PathBuf>) -> MigrateResult<Self> {
        let path = path.into();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| MigrationError::migration_file("Invalid path"))?;

        let (version, name) = parse_migration_name(stem)?;
        Ok(Self {
            path,
            version,
            name,
        })
    }

    /// File name including extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Migration file reader/writer.
pub struct MigrationFileManager {
    /// Directory where migrations are stored.
    migrations_dir: PathBuf,
}

impl MigrationFileManager {
    /// Create a new file manager.
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
        }
    }

    /// Get the migrations directory.
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Ensure the migrations directory exists.
    pub fn ensure_dir(&self) -> MigrateResult<()> {
        std::fs::create_dir_all(&self.migrations_dir)?;
        Ok(())
    }

    /// List all migration files, sorted by name.
    ///
    /// A missing directory has no migrations. Files that do not look like
    /// `<version>_<name>.<ext>` are ignored.
    pub fn list_migrations(&self) -> MigrateResult<Vec<MigrationFile>> {
        let mut migrations = Vec::new();

        if !self.migrations_dir.exists() {
            return Ok(migrations);
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.migrations_dir)? {
            let path = entry?.path();
            if path.is_file() && !is_hidden(&path) {
                paths.push(path);
            }
        }

        // Sort by name (which should be timestamp-prefixed)
        paths.sort();

        for path in paths {
            match MigrationFile::from_path(&path) {
                Ok(migration) => migrations.push(migration),
                Err(e) => debug!(path = %path.display(), error = %e, "Ignoring file"),
            }
        }

        Ok(migrations)
    }

    /// Render a migration unit and write it as `<version>_<name>.<ext>`.
    pub fn write_migration(
        &self,
        unit: &MigrationUnit,
        renderer: &dyn MigrationRenderer,
    ) -> MigrateResult<PathBuf> {
        let content = renderer.render(unit)?;
        self.ensure_dir()?;

        let path = self
            .migrations_dir
            .join(format!("{}.{}", unit.file_stem(), renderer.extension()));

        if path.exists() {
            return Err(MigrationError::migration_file(format!(
                "{} already exists",
                path.display()
            )));
        }

        std::fs::write(&path, content)?;
        debug!(path = %path.display(), operations = unit.operations.len(), "Wrote migration");
        Ok(path)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Parse a migration file stem into (version, name).
fn parse_migration_name(stem: &str) -> MigrateResult<(String, String)> {
    let Some((version, name)) = stem.split_once('_') else {
        return Err(MigrationError::InvalidMigration(format!(
            "Invalid migration name format: {}",
            stem
        )));
    };

    if version.is_empty() || !version.chars().all(|c| c.is_ascii_digit()) {
        return Err(MigrationError::InvalidMigration(format!(
            "Invalid migration version (expected timestamp): {}",
            version
        )));
    }

    if name.is_empty() {
        return Err(MigrationError::InvalidMigration(format!(
            "Migration {} has no name",
            version
        )));
    }

    Ok((version.to_string(), name.to_string()))
}
