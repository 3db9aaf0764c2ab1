//! SQLite-backed store.
//!
//! Introspection goes through `sqlite_master` and the `pragma_*` table-valued
//! functions, so table names are always bound as parameters.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, params};
use tracing::debug;

use crate::error::MigrateResult;
use crate::field::StoreFamily;
use crate::history::{APPLIED_VERSIONS_SQL, MigrationHistoryRepository, SCHEMA_MIGRATIONS_TABLE};
use crate::introspect::{ColumnInfo, SchemaIntrospector};

const TABLE_EXISTS_SQL: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";

const COLUMNS_SQL: &str = "SELECT name, type FROM pragma_table_info(?1) ORDER BY cid";

const SINGLE_COLUMN_INDEX_SQL: &str = "SELECT COUNT(*) FROM pragma_index_list(?1) AS il \
     WHERE (SELECT COUNT(*) FROM pragma_index_info(il.name)) = 1 \
     AND (SELECT name FROM pragma_index_info(il.name)) = ?2";

const FOREIGN_KEY_SQL: &str =
    "SELECT COUNT(*) FROM pragma_foreign_key_list(?1) WHERE \"table\" = ?2 AND \"from\" = ?3";

/// A store backed by a SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open an existing database file. The file is never created.
    pub fn open(path: impl AsRef<Path>) -> MigrateResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI,
        )?;
        debug!(path = %path.display(), "Opened SQLite store");
        Ok(Self { conn })
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> MigrateResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Borrow the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> MigrateResult<i64> {
        Ok(self.conn.query_row(sql, params, |row| row.get(0))?)
    }
}

impl SchemaIntrospector for SqliteStore {
    fn family(&self) -> StoreFamily {
        StoreFamily::Sqlite
    }

    fn table_exists(&self, table: &str) -> MigrateResult<bool> {
        Ok(self.count(TABLE_EXISTS_SQL, params![table])? > 0)
    }

    fn columns(&self, table: &str) -> MigrateResult<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(COLUMNS_SQL)?;
        let rows = stmt.query_map(params![table], |row| {
            let name: String = row.get(0)?;
            let declared: String = row.get(1)?;
            Ok(ColumnInfo::new(name, native_type(&declared)))
        })?;

        let columns = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn index_exists(&self, table: &str, column: &str) -> MigrateResult<bool> {
        Ok(self.count(SINGLE_COLUMN_INDEX_SQL, params![table, column])? > 0)
    }

    fn foreign_key_exists(
        &self,
        from_table: &str,
        to_table: &str,
        column: &str,
    ) -> MigrateResult<bool> {
        Ok(self.count(FOREIGN_KEY_SQL, params![from_table, to_table, column])? > 0)
    }
}

impl MigrationHistoryRepository for SqliteStore {
    fn applied_versions(&self) -> MigrateResult<Vec<String>> {
        if !self.table_exists(SCHEMA_MIGRATIONS_TABLE)? {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(APPLIED_VERSIONS_SQL)?;
        let rows = stmt.query_map([], |row| {
            let version: rusqlite::types::Value = row.get(0)?;
            Ok(match version {
                rusqlite::types::Value::Integer(i) => i.to_string(),
                rusqlite::types::Value::Text(s) => s,
                other => format!("{:?}", other),
            })
        })?;

        let versions = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(versions)
    }
}

/// Map a declared SQLite column type onto the native vocabulary.
///
/// SQLite keeps whatever type text the column was declared with, so both
/// `varchar(255)` and `VARCHAR` read back as `string`.
pub fn native_type(declared: &str) -> String {
    let lowered = declared.trim().to_ascii_lowercase();
    let base = lowered
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let native = match base.as_str() {
        "varchar" | "character varying" | "char" | "character" | "nvarchar" | "nchar"
        | "string" => "string",
        "text" | "clob" => "text",
        "integer" | "int" | "bigint" | "smallint" | "tinyint" | "mediumint" | "int2" | "int8" => {
            "integer"
        }
        "real" | "float" | "double" | "double precision" => "float",
        "decimal" | "numeric" => "decimal",
        "boolean" | "bool" => "boolean",
        "date" => "date",
        "datetime" | "timestamp" => "datetime",
        "time" => "time",
        "blob" | "binary" | "" => "binary",
        other => other,
    };

    native.to_string()
}
