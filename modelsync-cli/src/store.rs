//! Opening the live database named by the configuration.

use std::path::{Path, PathBuf};

use modelsync_migrate::{MigrationError, SqliteStore, StoreFamily};
use tracing::warn;

/// Open the configured store.
///
/// Every failure is reported as [`MigrationError::NoStoreConnection`]; the
/// caller decides whether that is fatal.
pub fn open_store(
    provider: &str,
    url: Option<&str>,
    root: &Path,
) -> Result<SqliteStore, MigrationError> {
    let family = StoreFamily::from_provider(provider);
    if family != StoreFamily::Sqlite {
        return Err(MigrationError::no_store_connection(format!(
            "no driver available for provider '{}'",
            provider
        )));
    }

    let url = url.ok_or_else(|| MigrationError::no_store_connection("no database url configured"))?;
    let path = sqlite_path(url, root);

    if !path.exists() {
        return Err(MigrationError::no_store_connection(format!(
            "database {} does not exist",
            path.display()
        )));
    }

    SqliteStore::open(&path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to open database");
        MigrationError::no_store_connection(e.to_string())
    })
}

/// Resolve a SQLite url (`sqlite://`, `file:`, or a plain path) against `root`.
pub fn sqlite_path(url: &str, root: &Path) -> PathBuf {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .or_else(|| url.strip_prefix("file:"))
        .unwrap_or(url);
    root.join(path)
}
