//! # modelsync-migrate
//!
//! Schema comparison and migration generation for declarative model catalogs.
//!
//! This crate provides functionality for:
//! - Declaring models and their fields in a [`ModelRegistry`]
//! - Comparing declared fields against a live store through a [`SchemaIntrospector`]
//! - Refusing to compare while migration files are unapplied
//! - Building an ordered, idempotent list of [`Operation`]s
//! - Rendering operations to SQL or JSON migration files
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌───────────────────┐
//! │ Model        │────▶│ SchemaComparator   │────▶│ MigrationBuilder  │
//! │ Registry     │     └────────────────────┘     └───────────────────┘
//! └──────────────┘              │                          │
//!                               ▼                          ▼
//!                       ┌────────────────┐        ┌─────────────────┐
//!                       │ Introspector   │        │ Renderer/Writer │
//!                       └────────────────┘        └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use modelsync_migrate::{
//!     ComparisonOutcome, FieldOptions, MemoryStore, MigrationBuilder, MigrationConfig,
//!     ModelRegistry, SchemaComparator, StoreFamily,
//! };
//!
//! let mut registry = ModelRegistry::new(StoreFamily::Sqlite);
//! let mut product = registry.model("Product");
//! product.field("name", "string", FieldOptions::new())?;
//! product.field("sku", "string", FieldOptions::new())?;
//! registry.register(product)?;
//!
//! let store = MemoryStore::new(StoreFamily::Sqlite)
//!     .with_table("products", &[("id", "integer"), ("name", "string")]);
//! let config = MigrationConfig::new().migrations_dir("target/doc-migrations-none");
//!
//! let comparator = SchemaComparator::new(&registry, &config)
//!     .with_introspector(&store)
//!     .with_history(&store);
//!
//! if let ComparisonOutcome::Changes(changes) = comparator.compare_all(None)? {
//!     let unit = MigrationBuilder::new(&store).build(&changes)?;
//!     assert_eq!(unit.name(), "add_sku");
//! }
//! # Ok::<(), modelsync_migrate::MigrationError>(())
//! ```
//!
//! ## Migration Files
//!
//! Generated migrations are single files named after their version and name:
//!
//! ```text
//! db/migrate/
//! ├── 20250511183225_create_products.sql
//! └── 20250512090000_add_sku.sql
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod field;
pub mod file;
pub mod history;
pub mod introspect;
pub mod model;
pub mod normalize;
pub mod operation;
pub mod render;
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-exports
pub use config::MigrationConfig;
pub use diff::{
    ChangeObserver, ChangeSet, ChangesByModel, ComparisonOutcome, MANAGED_COLUMNS, ModelChanges,
    ModelSummary, SchemaComparator,
};
pub use error::{MigrateResult, MigrationError};
pub use field::{
    ColumnType, Field, FieldOptions, OptionValue, RelationKind, RelationRef, StoreFamily,
    infer_relation, table_name_for, valid_types,
};
pub use file::{MigrationFile, MigrationFileManager};
pub use history::{MigrationHistoryRepository, pending_migrations};
pub use introspect::{ColumnInfo, MemoryStore, SchemaIntrospector, StoreCall};
pub use model::{ModelDescriptor, ModelRegistry};
pub use normalize::{normalize, normalize_type};
pub use operation::{MigrationBuilder, MigrationUnit, Operation};
pub use render::{JsonRenderer, MigrationRenderer, RenderFormat, SqlRenderer};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
