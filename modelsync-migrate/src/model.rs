//! Model descriptors and the registry the comparator reads from.
//!
//! Models are registered explicitly before a run:
//!
//! ```rust
//! use modelsync_migrate::{FieldOptions, ModelDescriptor, ModelRegistry, StoreFamily};
//!
//! let mut registry = ModelRegistry::new(StoreFamily::Sqlite);
//! let mut post = registry.model("Post");
//! post.field("title", "string", FieldOptions::new())?;
//! post.belongs_to("author", false, FieldOptions::new())?;
//! post.has_many("comments", FieldOptions::new());
//! registry.register(post)?;
//! # Ok::<(), modelsync_migrate::MigrationError>(())
//! ```

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{MigrateResult, MigrationError};
use crate::field::{
    Field, FieldOptions, OptionValue, RelationKind, RelationRef, StoreFamily, table_name_for,
};

/// The declared shape of one model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    name: String,
    table_name: String,
    family: StoreFamily,
    fields: IndexMap<String, Field>,
    relations: IndexMap<RelationKind, IndexMap<String, RelationRef>>,
}

impl ModelDescriptor {
    /// Create a descriptor whose table name follows the naming convention.
    pub fn new(name: impl Into<String>, family: StoreFamily) -> Self {
        let name = name.into();
        let table_name = table_name_for(&name);
        Self {
            name,
            table_name,
            family,
            fields: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }

    /// Override the table name.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Fully qualified model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Store family field types are validated against.
    pub fn family(&self) -> StoreFamily {
        self.family
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Look up a declared field.
    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Whether any field has been declared.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Relations of a given kind, keyed by association name.
    pub fn relations(&self, kind: RelationKind) -> Option<&IndexMap<String, RelationRef>> {
        self.relations.get(&kind)
    }

    /// Declare a field. Redeclaring a name replaces the earlier field in place.
    pub fn field(
        &mut self,
        name: impl Into<String>,
        ty: &str,
        options: FieldOptions,
    ) -> MigrateResult<&mut Self> {
        let field = Field::validated(name, ty, options, self.family)?;
        self.fields.insert(field.name.clone(), field);
        Ok(self)
    }

    /// Declare a `belongs_to` association.
    ///
    /// Adds an indexed integer `<name>_id` field unless a field with that name
    /// exists already. A `foreign_key` option overrides the column name.
    pub fn belongs_to(
        &mut self,
        name: impl Into<String>,
        optional: bool,
        options: FieldOptions,
    ) -> MigrateResult<&mut Self> {
        let name = name.into();
        let foreign_key = options
            .get("foreign_key")
            .and_then(OptionValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_id", name));

        if !self.fields.contains_key(&foreign_key) {
            let mut field_options = FieldOptions::new();
            field_options.insert("index".to_string(), OptionValue::Bool(true));
            field_options.insert("null".to_string(), OptionValue::Bool(!optional));
            self.field(foreign_key.clone(), "integer", field_options)?;
        }

        let target = options
            .get("class_name")
            .and_then(OptionValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let relation =
            RelationRef::new(RelationKind::BelongsTo, target, foreign_key).with_options(options);
        self.record_relation(name, relation);
        Ok(self)
    }

    /// Record a `has_one` association. Produces no field.
    pub fn has_one(&mut self, name: impl Into<String>, options: FieldOptions) -> &mut Self {
        self.record_bookkeeping(RelationKind::HasOne, name.into(), options)
    }

    /// Record a `has_many` association. Produces no field.
    pub fn has_many(&mut self, name: impl Into<String>, options: FieldOptions) -> &mut Self {
        self.record_bookkeeping(RelationKind::HasMany, name.into(), options)
    }

    /// Record a `has_and_belongs_to_many` association. Produces no field.
    pub fn has_and_belongs_to_many(
        &mut self,
        name: impl Into<String>,
        options: FieldOptions,
    ) -> &mut Self {
        self.record_bookkeeping(RelationKind::HasAndBelongsToMany, name.into(), options)
    }

    fn record_bookkeeping(
        &mut self,
        kind: RelationKind,
        name: String,
        options: FieldOptions,
    ) -> &mut Self {
        let target = options
            .get("class_name")
            .and_then(OptionValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let foreign_key = options
            .get("foreign_key")
            .and_then(OptionValue::as_str)
            .map(str::to_string)
            .unwrap_or_default();
        let relation = RelationRef::new(kind, target, foreign_key).with_options(options);
        self.record_relation(name, relation);
        self
    }

    fn record_relation(&mut self, name: String, relation: RelationRef) {
        self.relations
            .entry(relation.kind)
            .or_default()
            .insert(name, relation);
    }
}

/// Every model known to a run, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    family: StoreFamily,
    models: IndexMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    /// Create an empty registry for a store family.
    pub fn new(family: StoreFamily) -> Self {
        Self {
            family,
            models: IndexMap::new(),
        }
    }

    /// Store family of this registry.
    pub fn family(&self) -> StoreFamily {
        self.family
    }

    /// Start a descriptor bound to this registry's family.
    pub fn model(&self, name: impl Into<String>) -> ModelDescriptor {
        ModelDescriptor::new(name, self.family)
    }

    /// Register a model. Names must be unique.
    pub fn register(&mut self, model: ModelDescriptor) -> MigrateResult<()> {
        if model.family != self.family {
            return Err(MigrationError::config(format!(
                "model '{}' was declared for {} but the registry targets {}",
                model.name, model.family, self.family
            )));
        }
        if self.models.contains_key(&model.name) {
            return Err(MigrationError::config(format!(
                "model '{}' is registered twice",
                model.name
            )));
        }
        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    /// Look up a model by name.
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.get(name)
    }

    /// Iterate models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.values()
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no model is registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ColumnType;
    use pretty_assertions::assert_eq;

    fn opts(pairs: &[(&str, OptionValue)]) -> FieldOptions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_field_keeps_declaration_order_and_options() {
        let mut model = ModelDescriptor::new("Post", StoreFamily::Sqlite);
        model
            .field("title", "string", opts(&[("null", false.into())]))
            .unwrap()
            .field("views", "integer", FieldOptions::new())
            .unwrap();

        let names: Vec<_> = model.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title", "views"]);
        let title = model.field_named("title").unwrap();
        assert_eq!(title.ty, ColumnType::String);
        assert_eq!(title.options["null"], OptionValue::Bool(false));
        assert_eq!(model.table_name(), "posts");
    }

    #[test]
    fn test_field_rejects_invalid_type() {
        let mut model = ModelDescriptor::new("Post", StoreFamily::Sqlite);
        let err = model.field("payload", "jsonb", FieldOptions::new()).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidFieldType { .. }));
        assert!(!model.has_fields());
    }

    #[test]
    fn test_belongs_to_adds_foreign_key_field() {
        let mut model = ModelDescriptor::new("Post", StoreFamily::Sqlite);
        model.belongs_to("author", true, FieldOptions::new()).unwrap();

        let fk = model.field_named("author_id").unwrap();
        assert_eq!(fk.ty, ColumnType::Integer);
        assert_eq!(fk.options["index"], OptionValue::Bool(true));
        assert_eq!(fk.options["null"], OptionValue::Bool(false));
        assert!(fk.has_relation());

        let relation = &model.relations(RelationKind::BelongsTo).unwrap()["author"];
        assert_eq!(relation.foreign_key, "author_id");
    }

    #[test]
    fn test_belongs_to_keeps_existing_field() {
        let mut model = ModelDescriptor::new("Post", StoreFamily::Sqlite);
        model
            .field("writer_ref", "integer", FieldOptions::new())
            .unwrap();
        model
            .belongs_to(
                "writer",
                false,
                opts(&[("foreign_key", "writer_ref".into())]),
            )
            .unwrap();

        assert_eq!(model.fields().count(), 1);
        assert!(model.field_named("writer_id").is_none());
        assert!(model.field_named("writer_ref").unwrap().options.is_empty());
    }

    #[test]
    fn test_bookkeeping_relations_add_no_fields() {
        let mut model = ModelDescriptor::new("User", StoreFamily::Sqlite);
        model
            .has_one("profile", opts(&[("dependent", "destroy".into())]))
            .has_many("comments", FieldOptions::new())
            .has_and_belongs_to_many("tags", FieldOptions::new());

        assert!(!model.has_fields());
        let has_one = model.relations(RelationKind::HasOne).unwrap();
        assert_eq!(
            has_one["profile"].options["dependent"],
            OptionValue::String("destroy".into())
        );
        assert!(model.relations(RelationKind::HasMany).unwrap().contains_key("comments"));
        assert!(
            model
                .relations(RelationKind::HasAndBelongsToMany)
                .unwrap()
                .contains_key("tags")
        );
    }

    #[test]
    fn test_registry_preserves_order_and_rejects_duplicates() {
        let mut registry = ModelRegistry::new(StoreFamily::Sqlite);
        registry.register(registry.model("User")).unwrap();
        registry.register(registry.model("Post")).unwrap();

        let names: Vec<_> = registry.iter().map(ModelDescriptor::name).collect();
        assert_eq!(names, vec!["User", "Post"]);
        assert!(registry.register(registry.model("User")).is_err());
    }

    #[test]
    fn test_registry_rejects_family_mismatch() {
        let mut registry = ModelRegistry::new(StoreFamily::Sqlite);
        let model = ModelDescriptor::new("User", StoreFamily::Postgres);
        assert!(registry.register(model).is_err());
    }
}
