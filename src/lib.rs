//! # modelsync
//!
//! Generate schema migrations by comparing declared models with a live database.
//!
//! modelsync provides:
//! - An explicit registry of model descriptors and their fields
//! - A comparator that classifies every field as added, changed, or removed
//! - A builder that turns those changes into ordered, idempotent operations
//! - SQL and JSON renderers for the resulting migration files
//!
//! ## Quick Start
//!
//! ```rust
//! use modelsync::prelude::*;
//!
//! let mut registry = ModelRegistry::new(StoreFamily::Sqlite);
//! let mut post = registry.model("Post");
//! post.field("title", "string", FieldOptions::new())?;
//! post.belongs_to("author", false, FieldOptions::new())?;
//! registry.register(post)?;
//!
//! // A store with no tables: everything is new.
//! let store = MemoryStore::new(StoreFamily::Sqlite);
//! let config = MigrationConfig::new().migrations_dir("target/doc-quickstart-none");
//! let comparator = SchemaComparator::new(&registry, &config)
//!     .with_introspector(&store)
//!     .with_history(&store);
//!
//! if let ComparisonOutcome::Changes(changes) = comparator.compare_all(None)? {
//!     let unit = MigrationBuilder::new(&store).build(&changes)?;
//!     assert_eq!(unit.name(), "create_posts");
//!     let sql = SqlRenderer::new(StoreFamily::Sqlite).render(&unit)?;
//!     assert!(sql.contains("CREATE TABLE \"posts\""));
//! }
//! # Ok::<(), modelsync::MigrationError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Schema comparison and migration generation.
pub mod migrate {
    pub use modelsync_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        ChangeSet, ComparisonOutcome, FieldOptions, MemoryStore, MigrationBuilder,
        MigrationConfig, MigrationFileManager, MigrationRenderer, ModelRegistry, ModelSummary,
        SchemaComparator, SchemaIntrospector, SqlRenderer, StoreFamily,
    };
    #[cfg(feature = "sqlite")]
    pub use crate::migrate::SqliteStore;
}

// Re-export key types at the crate root
pub use migrate::{MigrateResult, MigrationError, Operation};
