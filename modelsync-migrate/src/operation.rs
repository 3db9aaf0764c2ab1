//! Migration operations and the builder that derives them from change sets.

use chrono::{DateTime, Utc};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diff::ChangesByModel;
use crate::error::{MigrateResult, MigrationError};
use crate::field::{Field, RelationRef};
use crate::introspect::{SchemaIntrospector, degrade};
use crate::model::ModelDescriptor;

/// Number of name tokens that make up a migration's name.
pub const NAME_TOKEN_LIMIT: usize = 4;

/// Format of migration versions.
pub const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

/// A single abstract schema mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Create a table with the given columns, plus `created_at`/`updated_at`
    /// when `timestamps` is set.
    CreateTable {
        table: String,
        columns: Vec<Field>,
        timestamps: bool,
    },
    AddColumn {
        table: String,
        field: Field,
    },
    ChangeColumn {
        table: String,
        field: Field,
    },
    RemoveColumn {
        table: String,
        field: Field,
    },
    AddIndex {
        table: String,
        column: String,
    },
    AddForeignKey {
        table: String,
        column: String,
        ref_table: String,
    },
}

impl Operation {
    /// Table the operation applies to.
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable { table, .. }
            | Self::AddColumn { table, .. }
            | Self::ChangeColumn { table, .. }
            | Self::RemoveColumn { table, .. }
            | Self::AddIndex { table, .. }
            | Self::AddForeignKey { table, .. } => table,
        }
    }

    /// Short description for logs and terminal output.
    pub fn describe(&self) -> String {
        match self {
            Self::CreateTable { table, columns, .. } => {
                format!("create table {} ({} columns)", table, columns.len())
            }
            Self::AddColumn { table, field } => {
                format!("add column {}.{} {}", table, field.name, field.ty)
            }
            Self::ChangeColumn { table, field } => {
                format!("change column {}.{} to {}", table, field.name, field.ty)
            }
            Self::RemoveColumn { table, field } => {
                format!("remove column {}.{}", table, field.name)
            }
            Self::AddIndex { table, column } => format!("add index on {}.{}", table, column),
            Self::AddForeignKey {
                table,
                column,
                ref_table,
            } => format!("add foreign key {}.{} -> {}", table, column, ref_table),
        }
    }
}

/// One generated, named, timestamped batch of operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationUnit {
    /// Version, derived from the build timestamp.
    pub version: String,
    /// When the build started.
    pub created_at: DateTime<Utc>,
    /// Every name token accumulated during the build.
    pub name_tokens: Vec<String>,
    /// Operations, in application order.
    pub operations: Vec<Operation>,
}

impl MigrationUnit {
    /// Create a unit stamped with the given time.
    pub fn new(
        created_at: DateTime<Utc>,
        name_tokens: Vec<String>,
        operations: Vec<Operation>,
    ) -> Self {
        Self {
            version: created_at.format(VERSION_FORMAT).to_string(),
            created_at,
            name_tokens,
            operations,
        }
    }

    /// Name built from the first four tokens (`create_products_add_sku`).
    ///
    /// Tokens past the fourth are dropped.
    pub fn name(&self) -> String {
        if self.name_tokens.is_empty() {
            return "migration".to_string();
        }
        self.name_tokens
            .iter()
            .take(NAME_TOKEN_LIMIT)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("_")
    }

    /// The name in Pascal case (`CreateProductsAddSku`).
    pub fn class_name(&self) -> String {
        self.name().to_case(Case::Pascal)
    }

    /// `<version>_<name>`, used as the migration file stem.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.version, self.name())
    }

    /// Whether the unit holds no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Builds a [`MigrationUnit`] from the comparator's change sets.
///
/// Foreign keys and indexes are checked against the live store before they
/// are emitted, so re-running after a partial failure does not duplicate them.
pub struct MigrationBuilder<I> {
    introspector: I,
}

impl<I: SchemaIntrospector> MigrationBuilder<I> {
    /// Create a builder that checks existing indexes and keys through `introspector`.
    pub fn new(introspector: I) -> Self {
        Self { introspector }
    }

    /// Build a unit stamped with the current time.
    pub fn build(&self, changes: &ChangesByModel<'_>) -> MigrateResult<MigrationUnit> {
        self.build_at(changes, Utc::now())
    }

    /// Build a unit stamped with `now`.
    ///
    /// Empty input is reported as [`MigrationError::NoChanges`].
    pub fn build_at(
        &self,
        changes: &ChangesByModel<'_>,
        now: DateTime<Utc>,
    ) -> MigrateResult<MigrationUnit> {
        if changes.is_empty() {
            return Err(MigrationError::NoChanges);
        }

        let mut operations = Vec::new();
        let mut tokens = Vec::new();

        for model_changes in changes.values() {
            let model = model_changes.model;
            let table = model.table_name();

            let exists = degrade(self.introspector.table_exists(table), "table_exists", table);
            if !exists {
                self.create_table(model, &mut operations, &mut tokens);
                continue;
            }

            let set = &model_changes.changes;

            for field in &set.add_fields {
                tokens.push("add".to_string());
                tokens.push(field.name.clone());
                operations.push(Operation::AddColumn {
                    table: table.to_string(),
                    field: field.clone(),
                });

                self.add_index(table, field, &mut operations);
                if let Some(relation) = &field.relation {
                    self.add_foreign_key(table, field, relation, &mut operations);
                }
            }

            for field in &set.change_fields {
                tokens.push("change".to_string());
                tokens.push(field.name.clone());
                operations.push(Operation::ChangeColumn {
                    table: table.to_string(),
                    field: field.clone(),
                });
            }

            for field in &set.remove_fields {
                tokens.push("delete".to_string());
                tokens.push(field.name.clone());
                operations.push(Operation::RemoveColumn {
                    table: table.to_string(),
                    field: field.clone(),
                });
            }
        }

        let unit = MigrationUnit::new(now, tokens, operations);
        info!(
            version = %unit.version,
            name = %unit.name(),
            operations = unit.operations.len(),
            "Built migration unit"
        );
        Ok(unit)
    }

    fn create_table(
        &self,
        model: &ModelDescriptor,
        operations: &mut Vec<Operation>,
        tokens: &mut Vec<String>,
    ) {
        let table = model.table_name();
        tokens.push("create".to_string());
        tokens.push(table.to_string());

        operations.push(Operation::CreateTable {
            table: table.to_string(),
            columns: model.fields().cloned().collect(),
            timestamps: true,
        });

        for field in model.fields() {
            self.add_index(table, field, operations);
            if let Some(relation) = &field.relation {
                self.add_foreign_key(table, field, relation, operations);
            }
        }
    }

    /// Index fields marked `index: true` and reference columns, unless the
    /// index is already there.
    fn add_index(&self, table: &str, field: &Field, operations: &mut Vec<Operation>) {
        if !field.is_indexed() && !field.has_relation() {
            return;
        }

        let present = degrade(
            self.introspector.index_exists(table, &field.name),
            "index_exists",
            table,
        );
        if present {
            debug!(table, column = %field.name, "Index already present");
            return;
        }

        operations.push(Operation::AddIndex {
            table: table.to_string(),
            column: field.name.clone(),
        });
    }

    fn add_foreign_key(
        &self,
        table: &str,
        field: &Field,
        relation: &RelationRef,
        operations: &mut Vec<Operation>,
    ) {
        let ref_table = relation.referenced_table();
        let present = degrade(
            self.introspector
                .foreign_key_exists(table, &ref_table, &field.name),
            "foreign_key_exists",
            table,
        );

        if present {
            debug!(
                table,
                column = %field.name,
                ref_table = %ref_table,
                "Foreign key already present"
            );
            return;
        }

        operations.push(Operation::AddForeignKey {
            table: table.to_string(),
            column: field.name.clone(),
            ref_table,
        });
    }
}
