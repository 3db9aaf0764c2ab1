//! Live schema introspection.
//!
//! The comparator never talks to a database directly. It asks a
//! [`SchemaIntrospector`] whether tables, indexes, and foreign keys exist,
//! and which columns a table has. Every call is allowed to fail; callers
//! degrade a failure to "does not exist".

use std::cell::Cell;
use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MigrateResult, MigrationError};
use crate::field::StoreFamily;
use crate::history::MigrationHistoryRepository;

/// A live column as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Native type name (e.g. "string", "integer", "decimal").
    pub native_type: String,
}

impl ColumnInfo {
    /// Create a column description.
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
        }
    }
}

/// Trait for reading the live schema of a store.
pub trait SchemaIntrospector {
    /// Store family, used to pick the valid type vocabulary.
    fn family(&self) -> StoreFamily;

    /// Check whether a table exists.
    fn table_exists(&self, table: &str) -> MigrateResult<bool>;

    /// Get the columns of a table, in table order.
    fn columns(&self, table: &str) -> MigrateResult<Vec<ColumnInfo>>;

    /// Check whether a single-column index exists.
    fn index_exists(&self, table: &str, column: &str) -> MigrateResult<bool>;

    /// Check whether a foreign key from `from_table.column` to `to_table` exists.
    fn foreign_key_exists(
        &self,
        from_table: &str,
        to_table: &str,
        column: &str,
    ) -> MigrateResult<bool>;
}

impl<T: SchemaIntrospector + ?Sized> SchemaIntrospector for &T {
    fn family(&self) -> StoreFamily {
        (**self).family()
    }

    fn table_exists(&self, table: &str) -> MigrateResult<bool> {
        (**self).table_exists(table)
    }

    fn columns(&self, table: &str) -> MigrateResult<Vec<ColumnInfo>> {
        (**self).columns(table)
    }

    fn index_exists(&self, table: &str, column: &str) -> MigrateResult<bool> {
        (**self).index_exists(table, column)
    }

    fn foreign_key_exists(
        &self,
        from_table: &str,
        to_table: &str,
        column: &str,
    ) -> MigrateResult<bool> {
        (**self).foreign_key_exists(from_table, to_table, column)
    }
}

/// Unwrap an introspection result, logging a failure and falling back to
/// the default ("does not exist", no columns).
pub(crate) fn degrade<T: Default>(result: MigrateResult<T>, call: &str, table: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(call, table, error = %e, "Introspection failed, assuming absent");
        T::default()
    })
}

/// Store calls that [`MemoryStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    TableExists,
    Columns,
    IndexExists,
    ForeignKeyExists,
    AppliedVersions,
}

/// A store held entirely in memory.
///
/// Useful for tests and dry runs. It counts introspection calls and can
/// simulate failures of individual call kinds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    family: StoreFamily,
    tables: IndexMap<String, Vec<ColumnInfo>>,
    indexes: HashSet<(String, String)>,
    foreign_keys: HashSet<(String, String, String)>,
    applied: Vec<String>,
    failing: HashSet<StoreCall>,
    calls: Cell<usize>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(family: StoreFamily) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }

    /// Add a table with `(name, native_type)` columns.
    pub fn with_table(mut self, table: &str, columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, ty)| ColumnInfo::new(*name, *ty))
            .collect();
        self.tables.insert(table.to_string(), columns);
        self
    }

    /// Add a single-column index.
    pub fn with_index(mut self, table: &str, column: &str) -> Self {
        self.indexes.insert((table.to_string(), column.to_string()));
        self
    }

    /// Add a foreign key.
    pub fn with_foreign_key(mut self, from_table: &str, to_table: &str, column: &str) -> Self {
        self.foreign_keys.insert((
            from_table.to_string(),
            to_table.to_string(),
            column.to_string(),
        ));
        self
    }

    /// Mark a migration version as applied.
    pub fn with_applied(mut self, version: &str) -> Self {
        self.applied.push(version.to_string());
        self
    }

    /// Make every call of the given kind fail.
    pub fn failing(mut self, call: StoreCall) -> Self {
        self.failing.insert(call);
        self
    }

    /// Number of introspection calls served so far (history reads excluded).
    pub fn introspection_calls(&self) -> usize {
        self.calls.get()
    }

    fn enter(&self, call: StoreCall) -> MigrateResult<()> {
        if call != StoreCall::AppliedVersions {
            self.calls.set(self.calls.get() + 1);
        }
        if self.failing.contains(&call) {
            return Err(MigrationError::introspection(format!(
                "simulated failure of {:?}",
                call
            )));
        }
        Ok(())
    }
}

impl SchemaIntrospector for MemoryStore {
    fn family(&self) -> StoreFamily {
        self.family
    }

    fn table_exists(&self, table: &str) -> MigrateResult<bool> {
        self.enter(StoreCall::TableExists)?;
        Ok(self.tables.contains_key(table))
    }

    fn columns(&self, table: &str) -> MigrateResult<Vec<ColumnInfo>> {
        self.enter(StoreCall::Columns)?;
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    fn index_exists(&self, table: &str, column: &str) -> MigrateResult<bool> {
        self.enter(StoreCall::IndexExists)?;
        Ok(self
            .indexes
            .contains(&(table.to_string(), column.to_string())))
    }

    fn foreign_key_exists(
        &self,
        from_table: &str,
        to_table: &str,
        column: &str,
    ) -> MigrateResult<bool> {
        self.enter(StoreCall::ForeignKeyExists)?;
        Ok(self.foreign_keys.contains(&(
            from_table.to_string(),
            to_table.to_string(),
            column.to_string(),
        )))
    }
}

impl MigrationHistoryRepository for MemoryStore {
    fn applied_versions(&self) -> MigrateResult<Vec<String>> {
        self.enter(StoreCall::AppliedVersions)?;
        Ok(self.applied.clone())
    }
}
