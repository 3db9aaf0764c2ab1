//! Rendering of migration units to file contents.

use serde::{Deserialize, Serialize};

use crate::error::{MigrateResult, MigrationError};
use crate::field::{ColumnType, Field, OptionValue, StoreFamily};
use crate::operation::{MigrationUnit, Operation};

/// Turns a [`MigrationUnit`] into the text of a migration file.
pub trait MigrationRenderer {
    /// Render the unit.
    fn render(&self, unit: &MigrationUnit) -> MigrateResult<String>;

    /// File extension, without the dot.
    fn extension(&self) -> &str;
}

/// Output format of generated migrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Sql,
    Json,
}

impl RenderFormat {
    /// Build the renderer for this format.
    pub fn renderer(self, family: StoreFamily) -> Box<dyn MigrationRenderer> {
        match self {
            Self::Sql => Box::new(SqlRenderer::new(family)),
            Self::Json => Box::new(JsonRenderer),
        }
    }
}

/// Renders the unit as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl MigrationRenderer for JsonRenderer {
    fn render(&self, unit: &MigrationUnit) -> MigrateResult<String> {
        let mut json =
            serde_json::to_string_pretty(unit).map_err(|e| MigrationError::render(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    fn extension(&self) -> &str {
        "json"
    }
}

/// Renders the unit as DDL for a store family.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlRenderer {
    family: StoreFamily,
}

impl SqlRenderer {
    /// Create a renderer for the given family.
    pub fn new(family: StoreFamily) -> Self {
        Self { family }
    }

    /// Render a single operation on its own.
    pub fn statement(&self, op: &Operation) -> String {
        self.statement_with(op, &[])
    }

    fn statement_with(&self, op: &Operation, inline: &[InlineKey<'_>]) -> String {
        match op {
            Operation::CreateTable {
                table,
                columns,
                timestamps,
            } => self.create_table(table, columns, *timestamps, inline),
            Operation::AddColumn { table, field } => format!(
                "ALTER TABLE {} ADD COLUMN {};",
                self.quote(table),
                self.column_definition(field)
            ),
            Operation::ChangeColumn { table, field } => self.change_column(table, field),
            Operation::RemoveColumn { table, field } => format!(
                "ALTER TABLE {} DROP COLUMN {};",
                self.quote(table),
                self.quote(&field.name)
            ),
            Operation::AddIndex { table, column } => {
                // MySQL has no IF NOT EXISTS for indexes
                let if_not_exists = match self.family {
                    StoreFamily::Mysql => "",
                    _ => "IF NOT EXISTS ",
                };
                format!(
                    "CREATE INDEX {}{} ON {} ({});",
                    if_not_exists,
                    self.quote(&format!("index_{}_on_{}", table, column)),
                    self.quote(table),
                    self.quote(column)
                )
            }
            Operation::AddForeignKey {
                table,
                column,
                ref_table,
            } => {
                if inline.iter().any(|key| key.matches(table, column)) {
                    return format!(
                        "-- foreign key {}.{} -> {} is declared in CREATE TABLE",
                        table, column, ref_table
                    );
                }
                if self.family == StoreFamily::Sqlite {
                    return format!(
                        "-- SQLite cannot add a foreign key to an existing table: {}.{} -> {}",
                        table, column, ref_table
                    );
                }
                format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({});",
                    self.quote(table),
                    self.quote(&format!("fk_{}_{}", table, column)),
                    self.quote(column),
                    self.quote(ref_table),
                    self.quote("id")
                )
            }
        }
    }

    /// Native column type for a field.
    pub fn column_type(&self, field: &Field) -> String {
        let option = |key: &str| field.options.get(key).and_then(OptionValue::as_i64);

        match (&field.ty, self.family) {
            (ColumnType::String, _) => format!("varchar({})", option("limit").unwrap_or(255)),
            (ColumnType::Decimal, _) => format!(
                "decimal({}, {})",
                option("precision").unwrap_or(10),
                option("scale").unwrap_or(0)
            ),
            (ColumnType::Text, StoreFamily::Mysql) => match option("limit") {
                Some(limit) if limit < 256 => "tinytext".to_string(),
                Some(limit) if limit < 65_536 => "text".to_string(),
                Some(limit) if limit < 16_777_216 => "mediumtext".to_string(),
                Some(_) => "longtext".to_string(),
                None => "text".to_string(),
            },
            (ColumnType::DateTime, StoreFamily::Postgres) => "timestamp".to_string(),
            (ty, _) => ty.as_str().to_string(),
        }
    }

    fn create_table(
        &self,
        table: &str,
        columns: &[Field],
        timestamps: bool,
        inline: &[InlineKey<'_>],
    ) -> String {
        let mut defs = vec![format!("{} {}", self.quote("id"), self.primary_key())];

        for field in columns {
            let mut def = self.column_definition(field);
            if let Some(key) = inline.iter().find(|key| key.matches(table, &field.name)) {
                def.push_str(&format!(
                    " REFERENCES {} ({})",
                    self.quote(key.ref_table),
                    self.quote("id")
                ));
            }
            defs.push(def);
        }

        if timestamps {
            let ty = self.timestamp_type();
            defs.push(format!("{} {} NOT NULL", self.quote("created_at"), ty));
            defs.push(format!("{} {} NOT NULL", self.quote("updated_at"), ty));
        }

        format!(
            "CREATE TABLE {} (\n    {}\n);",
            self.quote(table),
            defs.join(",\n    ")
        )
    }

    fn change_column(&self, table: &str, field: &Field) -> String {
        match self.family {
            StoreFamily::Mysql => format!(
                "ALTER TABLE {} MODIFY COLUMN {};",
                self.quote(table),
                self.column_definition(field)
            ),
            StoreFamily::Sqlite => format!(
                "-- SQLite cannot change a column type in place: {}.{} -> {}",
                table,
                field.name,
                self.column_type(field)
            ),
            StoreFamily::Postgres | StoreFamily::Common => format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {};",
                self.quote(table),
                self.quote(&field.name),
                self.column_type(field)
            ),
        }
    }

    fn column_definition(&self, field: &Field) -> String {
        let mut parts = vec![self.quote(&field.name), self.column_type(field)];

        if field.options.get("null").and_then(OptionValue::as_bool) == Some(false) {
            parts.push("NOT NULL".to_string());
        }

        if let Some(default) = field.options.get("default") {
            parts.push(format!("DEFAULT {}", default));
        }

        parts.join(" ")
    }

    /// Foreign keys on tables created earlier in the same unit.
    ///
    /// SQLite cannot add a constraint after the fact, so these are declared
    /// on the column inside `CREATE TABLE`. Other families use `ALTER TABLE`.
    fn inline_keys<'u>(&self, unit: &'u MigrationUnit) -> Vec<InlineKey<'u>> {
        if self.family != StoreFamily::Sqlite {
            return Vec::new();
        }

        let mut created = Vec::new();
        let mut keys = Vec::new();
        for op in &unit.operations {
            match op {
                Operation::CreateTable { table, .. } => created.push(table.as_str()),
                Operation::AddForeignKey {
                    table,
                    column,
                    ref_table,
                } if created.contains(&table.as_str()) => keys.push(InlineKey {
                    table,
                    column,
                    ref_table,
                }),
                _ => {}
            }
        }
        keys
    }

    fn primary_key(&self) -> &'static str {
        match self.family {
            StoreFamily::Postgres => "BIGSERIAL PRIMARY KEY",
            StoreFamily::Mysql => "BIGINT AUTO_INCREMENT PRIMARY KEY",
            StoreFamily::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            StoreFamily::Common => "INTEGER PRIMARY KEY",
        }
    }

    fn timestamp_type(&self) -> &'static str {
        match self.family {
            StoreFamily::Postgres => "timestamp",
            _ => "datetime",
        }
    }

    fn quote(&self, ident: &str) -> String {
        match self.family {
            StoreFamily::Mysql => format!("`{}`", ident),
            _ => format!("\"{}\"", ident),
        }
    }
}

/// A foreign key declared as a column constraint.
#[derive(Debug, Clone, Copy)]
struct InlineKey<'a> {
    table: &'a str,
    column: &'a str,
    ref_table: &'a str,
}

impl InlineKey<'_> {
    fn matches(&self, table: &str, column: &str) -> bool {
        self.table == table && self.column == column
    }
}

impl MigrationRenderer for SqlRenderer {
    fn render(&self, unit: &MigrationUnit) -> MigrateResult<String> {
        let mut out = format!(
            "-- {} ({})\n-- Generated at {}\n\n",
            unit.class_name(),
            unit.version,
            unit.created_at.to_rfc3339()
        );

        let inline = self.inline_keys(unit);
        let statements: Vec<String> = unit
            .operations
            .iter()
            .map(|op| self.statement_with(op, &inline))
            .collect();
        out.push_str(&statements.join("\n\n"));
        out.push('\n');
        Ok(out)
    }

    fn extension(&self) -> &str {
        "sql"
    }
}
