//! Migration history tracking and the pending-migrations gate.

use std::collections::HashSet;

use crate::error::MigrateResult;
use crate::file::MigrationFile;

/// Name of the table holding applied migration versions.
pub const SCHEMA_MIGRATIONS_TABLE: &str = "schema_migrations";

/// Query listing applied migration versions.
pub const APPLIED_VERSIONS_SQL: &str = "SELECT version FROM schema_migrations";

/// Read access to the store's record of applied migrations.
pub trait MigrationHistoryRepository {
    /// Versions of every migration the store has applied.
    fn applied_versions(&self) -> MigrateResult<Vec<String>>;
}

impl<T: MigrationHistoryRepository + ?Sized> MigrationHistoryRepository for &T {
    fn applied_versions(&self) -> MigrateResult<Vec<String>> {
        (**self).applied_versions()
    }
}

/// Migration files whose version the store has not applied, in file order.
pub fn pending_migrations<'a>(
    files: &'a [MigrationFile],
    applied: &[String],
) -> Vec<&'a MigrationFile> {
    let applied: HashSet<&str> = applied.iter().map(String::as_str).collect();
    files
        .iter()
        .filter(|file| !applied.contains(file.version.as_str()))
        .collect()
}
