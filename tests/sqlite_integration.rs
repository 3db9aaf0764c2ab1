//! End-to-end tests against a real SQLite database.

use modelsync::prelude::*;
use modelsync::{MigrationError, Operation};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn blog_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new(StoreFamily::Sqlite);

    let mut author = registry.model("Author");
    author.field("name", "string", FieldOptions::new()).unwrap();
    registry.register(author).unwrap();

    let mut post = registry.model("Post");
    post.field("title", "string", FieldOptions::new())
        .unwrap()
        .field("body", "text", FieldOptions::new())
        .unwrap();
    post.belongs_to("author", false, FieldOptions::new()).unwrap();
    registry.register(post).unwrap();

    registry
}

fn open_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch("CREATE TABLE schema_migrations (version varchar NOT NULL PRIMARY KEY);")
        .unwrap();
    store
}

fn record_applied(store: &SqliteStore, version: &str) {
    store
        .connection()
        .execute("INSERT INTO schema_migrations (version) VALUES (?1)", [version])
        .unwrap();
}

#[test]
fn test_generated_sql_applies_and_converges() {
    let dir = TempDir::new().unwrap();
    let config = MigrationConfig::new().migrations_dir(dir.path());
    let registry = blog_registry();
    let store = open_store();

    let comparator = SchemaComparator::new(&registry, &config)
        .with_introspector(&store)
        .with_history(&store);

    let outcome = comparator.compare_all(None).unwrap();
    let changes = outcome.changes().unwrap();
    assert_eq!(changes.len(), 2);

    let unit = MigrationBuilder::new(&store).build(changes).unwrap();
    assert_eq!(unit.name(), "create_authors_create_posts");
    assert!(unit.operations.contains(&Operation::AddForeignKey {
        table: "posts".into(),
        column: "author_id".into(),
        ref_table: "authors".into(),
    }));

    let sql = SqlRenderer::new(StoreFamily::Sqlite).render(&unit).unwrap();
    store.connection().execute_batch(&sql).unwrap();
    record_applied(&store, &unit.version);

    let outcome = comparator.compare_all(None).unwrap();
    assert!(!outcome.is_gated());
    assert!(outcome.changes().unwrap().is_empty());
}

#[test]
fn test_new_tables_keep_their_keys_and_indexes() {
    let dir = TempDir::new().unwrap();
    let config = MigrationConfig::new().migrations_dir(dir.path());
    let mut registry = blog_registry();
    let mut indexed = FieldOptions::new();
    indexed.insert("index".into(), true.into());
    let mut tag = registry.model("Tag");
    tag.field("slug", "string", indexed).unwrap();
    tag.belongs_to("post", false, FieldOptions::new()).unwrap();
    registry.register(tag).unwrap();
    let store = open_store();

    let comparator = SchemaComparator::new(&registry, &config)
        .with_introspector(&store)
        .with_history(&store);
    let outcome = comparator.compare_all(None).unwrap();
    let unit = MigrationBuilder::new(&store)
        .build(outcome.changes().unwrap())
        .unwrap();

    let sql = SqlRenderer::new(StoreFamily::Sqlite).render(&unit).unwrap();
    store.connection().execute_batch(&sql).unwrap();
    record_applied(&store, &unit.version);

    assert!(store.foreign_key_exists("posts", "authors", "author_id").unwrap());
    assert!(store.foreign_key_exists("tags", "posts", "post_id").unwrap());
    assert!(store.index_exists("posts", "author_id").unwrap());
    assert!(store.index_exists("tags", "slug").unwrap());
    assert!(store.index_exists("tags", "post_id").unwrap());

    // Nothing left for the builder to add
    let outcome = comparator.compare_all(None).unwrap();
    assert!(outcome.changes().unwrap().is_empty());
    let changes = outcome.changes().unwrap();
    assert!(matches!(
        MigrationBuilder::new(&store).build(changes),
        Err(MigrationError::NoChanges)
    ));
}

#[test]
fn test_column_changes_against_existing_table() {
    let dir = TempDir::new().unwrap();
    let config = MigrationConfig::new().migrations_dir(dir.path());
    let registry = blog_registry();
    let store = open_store();
    store
        .connection()
        .execute_batch(
            "CREATE TABLE authors (id INTEGER PRIMARY KEY, name varchar(255));
             CREATE TABLE posts (
                 id INTEGER PRIMARY KEY,
                 title integer,
                 legacy_flag boolean,
                 created_at datetime,
                 updated_at datetime
             );",
        )
        .unwrap();

    let comparator = SchemaComparator::new(&registry, &config)
        .with_introspector(&store)
        .with_history(&store);
    let outcome = comparator.compare_all(None).unwrap();
    let changes = outcome.changes().unwrap();

    let names: Vec<_> = changes.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Post"]);

    let set = &changes["Post"].changes;
    let added: Vec<_> = set.add_fields.iter().map(|f| f.name.as_str()).collect();
    let changed: Vec<_> = set.change_fields.iter().map(|f| f.name.as_str()).collect();
    let removed: Vec<_> = set.remove_fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(added, vec!["body", "author_id"]);
    assert_eq!(changed, vec!["title"]);
    assert_eq!(removed, vec!["legacy_flag"]);

    let unit = MigrationBuilder::new(&store).build(changes).unwrap();
    // Only the first four tokens name the migration.
    assert_eq!(unit.name(), "add_body_add_author_id");
    assert!(unit.operations.contains(&Operation::AddIndex {
        table: "posts".into(),
        column: "author_id".into(),
    }));
}

#[test]
fn test_unapplied_file_gates_comparison() {
    let dir = TempDir::new().unwrap();
    let config = MigrationConfig::new().migrations_dir(dir.path());
    let registry = blog_registry();
    let store = open_store();

    let comparator = SchemaComparator::new(&registry, &config)
        .with_introspector(&store)
        .with_history(&store);

    let outcome = comparator.compare_all(None).unwrap();
    let unit = MigrationBuilder::new(&store)
        .build(outcome.changes().unwrap())
        .unwrap();
    let renderer = SqlRenderer::new(StoreFamily::Sqlite);
    let path = MigrationFileManager::new(dir.path())
        .write_migration(&unit, &renderer)
        .unwrap();
    assert!(path.exists());

    // Written but not applied
    match comparator.compare_all(None).unwrap() {
        ComparisonOutcome::Gated { pending } => {
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].version, unit.version);
        }
        ComparisonOutcome::Changes(_) => panic!("expected the pending file to gate"),
    }

    store
        .connection()
        .execute_batch(&std::fs::read_to_string(&path).unwrap())
        .unwrap();
    record_applied(&store, &unit.version);

    let outcome = comparator.compare_all(None).unwrap();
    assert!(outcome.changes().unwrap().is_empty());
}

#[test]
fn test_build_without_changes_is_an_error() {
    let registry = blog_registry();
    let config = MigrationConfig::new();
    let store = open_store();
    let comparator = SchemaComparator::new(&registry, &config);

    let outcome = comparator.compare_all(None).unwrap();
    let changes = outcome.changes().unwrap();
    assert!(changes.is_empty());
    assert!(matches!(
        MigrationBuilder::new(&store).build(changes),
        Err(MigrationError::NoChanges)
    ));
}
