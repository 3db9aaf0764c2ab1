//! Comparison of declared models against the live store.
//!
//! [`SchemaComparator::compare_model`] classifies one model's fields into
//! additions, type changes, and removals. [`SchemaComparator::compare_all`]
//! runs that over the whole registry, after checking that the store has
//! applied every migration on disk.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MigrationConfig;
use crate::error::MigrateResult;
use crate::field::{Field, FieldOptions};
use crate::file::{MigrationFile, MigrationFileManager};
use crate::history::{MigrationHistoryRepository, pending_migrations};
use crate::introspect::{SchemaIntrospector, degrade};
use crate::model::{ModelDescriptor, ModelRegistry};
use crate::normalize::{normalize, normalize_type};

/// Columns maintained by the store itself and never diffed.
pub const MANAGED_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];

/// The three-way classification of one model's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    /// Declared fields with no live column.
    pub add_fields: Vec<Field>,
    /// Declared fields whose live column has a different coarse type.
    pub change_fields: Vec<Field>,
    /// Live columns with no declared field.
    pub remove_fields: Vec<Field>,
}

impl ChangeSet {
    /// Check if there are any differences.
    pub fn is_empty(&self) -> bool {
        self.add_fields.is_empty() && self.change_fields.is_empty() && self.remove_fields.is_empty()
    }

    /// Total number of field changes.
    pub fn len(&self) -> usize {
        self.add_fields.len() + self.change_fields.len() + self.remove_fields.len()
    }
}

/// A model together with its change set.
#[derive(Debug, Clone)]
pub struct ModelChanges<'a> {
    /// The declared model.
    pub model: &'a ModelDescriptor,
    /// Its differences from the live table.
    pub changes: ChangeSet,
}

/// Change sets keyed by model name, in registry order.
pub type ChangesByModel<'a> = IndexMap<String, ModelChanges<'a>>;

/// Per-model summary handed to a [`ChangeObserver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    /// Model name.
    pub model: String,
    /// Table the model maps to.
    pub table: String,
    /// Names of fields to add.
    pub add: Vec<String>,
    /// Names of fields whose type changed.
    pub change: Vec<String>,
    /// Names of live columns to remove.
    pub remove: Vec<String>,
}

impl ModelSummary {
    fn new(model: &ModelDescriptor, changes: &ChangeSet) -> Self {
        let names = |fields: &[Field]| fields.iter().map(|f| f.name.clone()).collect();
        Self {
            model: model.name().to_string(),
            table: model.table_name().to_string(),
            add: names(&changes.add_fields),
            change: names(&changes.change_fields),
            remove: names(&changes.remove_fields),
        }
    }
}

/// Receives a summary for every model included in a comparison result.
pub trait ChangeObserver {
    /// Called once per model with changes.
    fn model_changed(&self, summary: &ModelSummary);
}

impl<F: Fn(&ModelSummary)> ChangeObserver for F {
    fn model_changed(&self, summary: &ModelSummary) {
        self(summary)
    }
}

/// Outcome of [`SchemaComparator::compare_all`].
#[derive(Debug)]
pub enum ComparisonOutcome<'a> {
    /// The comparison ran. Only models with changes are included.
    Changes(ChangesByModel<'a>),
    /// Migration files exist that the store has not applied; nothing was compared.
    Gated {
        /// The unapplied files, in version order.
        pending: Vec<MigrationFile>,
    },
}

impl<'a> ComparisonOutcome<'a> {
    /// Whether the run was stopped by the pending-migrations gate.
    pub fn is_gated(&self) -> bool {
        matches!(self, Self::Gated { .. })
    }

    /// The change sets, if the comparison ran.
    pub fn changes(&self) -> Option<&ChangesByModel<'a>> {
        match self {
            Self::Changes(changes) => Some(changes),
            Self::Gated { .. } => None,
        }
    }
}

/// Compares a [`ModelRegistry`] against a live store.
pub struct SchemaComparator<'a> {
    registry: &'a ModelRegistry,
    config: &'a MigrationConfig,
    introspector: Option<&'a dyn SchemaIntrospector>,
    history: Option<&'a dyn MigrationHistoryRepository>,
}

impl<'a> SchemaComparator<'a> {
    /// Create a comparator with no store attached.
    ///
    /// Without a store every run finds nothing.
    pub fn new(registry: &'a ModelRegistry, config: &'a MigrationConfig) -> Self {
        Self {
            registry,
            config,
            introspector: None,
            history: None,
        }
    }

    /// Attach the live store.
    pub fn with_introspector(mut self, introspector: &'a dyn SchemaIntrospector) -> Self {
        self.introspector = Some(introspector);
        self
    }

    /// Attach the store's migration history.
    pub fn with_history(mut self, history: &'a dyn MigrationHistoryRepository) -> Self {
        self.history = Some(history);
        self
    }

    /// Diff one model against its live table.
    pub fn compare_model(&self, model: &ModelDescriptor) -> ChangeSet {
        let mut changes = ChangeSet::default();

        if !model.has_fields() {
            return changes;
        }

        let Some(introspector) = self.introspector else {
            return changes;
        };

        let table = model.table_name();

        if !degrade(introspector.table_exists(table), "table_exists", table) {
            changes.add_fields = model.fields().cloned().collect();
            return changes;
        }

        let columns = degrade(introspector.columns(table), "columns", table);
        debug!(
            table,
            columns = ?columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "Introspected columns"
        );

        for field in model.fields() {
            match columns.iter().find(|c| c.name == field.name) {
                None => changes.add_fields.push(field.clone()),
                Some(column)
                    if normalize(&column.native_type) != normalize_type(field.ty.clone()) =>
                {
                    changes.change_fields.push(field.clone())
                }
                Some(_) => {}
            }
        }

        for column in &columns {
            if MANAGED_COLUMNS.contains(&column.name.as_str()) {
                continue;
            }

            if model.field_named(&column.name).is_none() {
                changes.remove_fields.push(Field::new(
                    column.name.clone(),
                    normalize(&column.native_type),
                    FieldOptions::new(),
                ));
            }
        }

        changes
    }

    /// Diff every eligible model in the registry.
    ///
    /// Returns [`ComparisonOutcome::Gated`] without touching the introspector
    /// when migration files exist that the store has not applied.
    pub fn compare_all(
        &self,
        observer: Option<&dyn ChangeObserver>,
    ) -> MigrateResult<ComparisonOutcome<'a>> {
        let Some(introspector) = self.introspector else {
            warn!("No store connection, no models will be compared");
            return Ok(ComparisonOutcome::Changes(ChangesByModel::new()));
        };

        let pending = self.unapplied_migrations()?;
        if !pending.is_empty() {
            warn!(count = pending.len(), "Unapplied migrations, refusing to compare");
            return Ok(ComparisonOutcome::Gated { pending });
        }

        debug!(family = %introspector.family(), models = self.registry.len(), "Comparing models");

        let mut changes_by_model = ChangesByModel::new();

        for model in self.registry.iter() {
            if self.config.is_ignored_namespace(model.name()) {
                warn!(model = model.name(), "Skipping model (ignored namespace)");
                continue;
            }

            if self.config.is_ignored_table(model.table_name()) {
                warn!(
                    model = model.name(),
                    table = model.table_name(),
                    "Skipping model (ignored table)"
                );
                continue;
            }

            if !model.has_fields() {
                continue;
            }

            let changes = self.compare_model(model);
            if changes.is_empty() {
                continue;
            }

            if let Some(observer) = observer {
                observer.model_changed(&ModelSummary::new(model, &changes));
            }

            changes_by_model.insert(model.name().to_string(), ModelChanges { model, changes });
        }

        info!(models = changes_by_model.len(), "Found changes");
        Ok(ComparisonOutcome::Changes(changes_by_model))
    }

    /// Migration files the store has not applied yet.
    pub fn unapplied_migrations(&self) -> MigrateResult<Vec<MigrationFile>> {
        let files = MigrationFileManager::new(&self.config.migrations_dir).list_migrations()?;
        if files.is_empty() {
            return Ok(files);
        }

        let applied = match self.history {
            Some(history) => degrade(
                history.applied_versions(),
                "applied_versions",
                crate::history::SCHEMA_MIGRATIONS_TABLE,
            ),
            None => Vec::new(),
        };

        Ok(pending_migrations(&files, &applied)
            .into_iter()
            .cloned()
            .collect())
    }
}
