//! Integration tests for the modelsync CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get the modelsync binary
#[allow(deprecated)]
fn modelsync_cmd() -> Command {
    let mut cmd = Command::cargo_bin("modelsync").unwrap();
    cmd.env_remove("MODELSYNC_DATABASE_URL");
    cmd
}

const POST_MODEL: &str = r#"
name = "Post"

[[fields]]
name = "title"
type = "string"

[[fields]]
name = "views"
type = "integer"
"#;

/// Initialize a project with one model and an empty SQLite database
fn sqlite_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    modelsync_cmd()
        .args(["init"])
        .arg(temp_dir.path())
        .assert()
        .success();

    fs::write(temp_dir.path().join("app/models/post.toml"), POST_MODEL).unwrap();

    fs::create_dir_all(temp_dir.path().join("db")).unwrap();
    rusqlite::Connection::open(temp_dir.path().join("db/development.sqlite3"))
        .unwrap()
        .execute_batch("CREATE TABLE schema_migrations (version varchar NOT NULL PRIMARY KEY);")
        .unwrap();

    temp_dir
}

fn migration_files(project: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(project.join("db/migrate"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| !n.starts_with('.'))
        .collect();
    names.sort();
    names
}

fn make_migrations(project: &Path) -> assert_cmd::assert::Assert {
    modelsync_cmd()
        .current_dir(project)
        .arg("make-migrations")
        .assert()
}

#[test]
fn test_help_command() {
    modelsync_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: modelsync"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("make-migrations"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_version_command() {
    modelsync_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_help() {
    modelsync_cmd()
        .args(["init", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialize a new modelsync project"))
        .stdout(predicate::str::contains("--provider"))
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_init_creates_project_structure() {
    let temp_dir = TempDir::new().unwrap();

    modelsync_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "app", "--provider", "sqlite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized successfully"));

    let project_path = temp_dir.path().join("app");
    assert!(project_path.join("modelsync.toml").exists());
    assert!(project_path.join("app/models").is_dir());
    assert!(project_path.join("db/migrate").is_dir());

    let config = fs::read_to_string(project_path.join("modelsync.toml")).unwrap();
    assert!(config.contains("provider = \"sqlite\""));
}

#[test]
fn test_init_twice_requires_force() {
    let temp_dir = TempDir::new().unwrap();

    modelsync_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success();

    modelsync_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    modelsync_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_make_migrations_without_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    modelsync_cmd()
        .current_dir(temp_dir.path())
        .arg("make-migrations")
        .assert()
        .failure()
        .stderr(predicate::str::contains("modelsync init"));
}

#[test]
fn test_make_migrations_without_database_reports_no_changes() {
    let temp_dir = TempDir::new().unwrap();
    modelsync_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success();
    fs::write(temp_dir.path().join("app/models/post.toml"), POST_MODEL).unwrap();

    make_migrations(temp_dir.path())
        .success()
        .stdout(predicate::str::contains("No changes detected"));

    assert!(migration_files(temp_dir.path()).is_empty());
}

#[test]
fn test_make_migrations_creates_table_migration() {
    let project = sqlite_project();

    make_migrations(project.path())
        .success()
        .stdout(predicate::str::contains("Post"))
        .stdout(predicate::str::contains("Created migration"));

    let files = migration_files(project.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("_create_posts.sql"), "{}", files[0]);

    let sql = fs::read_to_string(project.path().join("db/migrate").join(&files[0])).unwrap();
    assert!(sql.contains("CREATE TABLE \"posts\""));
    assert!(sql.contains("\"title\" varchar(255)"));
    assert!(sql.contains("\"created_at\" datetime NOT NULL"));
}

#[test]
fn test_make_migrations_is_idempotent_once_applied() {
    let project = sqlite_project();
    make_migrations(project.path()).success();

    let files = migration_files(project.path());
    let version = files[0].split('_').next().unwrap().to_string();
    let sql = fs::read_to_string(project.path().join("db/migrate").join(&files[0])).unwrap();

    let conn = rusqlite::Connection::open(project.path().join("db/development.sqlite3")).unwrap();
    conn.execute_batch(&sql).unwrap();
    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [&version],
    )
    .unwrap();
    drop(conn);

    make_migrations(project.path())
        .success()
        .stdout(predicate::str::contains("No changes detected"));
    assert_eq!(migration_files(project.path()).len(), 1);
}

#[test]
fn test_make_migrations_refuses_with_pending_migrations() {
    let project = sqlite_project();
    fs::write(
        project.path().join("db/migrate/20230101000000_add_foo.sql"),
        "-- never applied\n",
    )
    .unwrap();

    make_migrations(project.path())
        .failure()
        .stdout(predicate::str::contains("Pending migrations detected"))
        .stdout(predicate::str::contains("20230101000000_add_foo.sql"))
        .stderr(predicate::str::contains(
            "Pending migrations detected: 20230101000000_add_foo.sql",
        ));

    assert_eq!(
        migration_files(project.path()),
        vec!["20230101000000_add_foo.sql"]
    );
}

#[test]
fn test_make_migrations_dry_run_writes_nothing() {
    let project = sqlite_project();

    modelsync_cmd()
        .current_dir(project.path())
        .args(["make_migrations", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"))
        .stdout(predicate::str::contains("CREATE TABLE"));

    assert!(migration_files(project.path()).is_empty());
}

#[test]
fn test_make_migrations_detects_column_changes() {
    let project = sqlite_project();
    rusqlite::Connection::open(project.path().join("db/development.sqlite3"))
        .unwrap()
        .execute_batch(
            "CREATE TABLE posts (
                 id INTEGER PRIMARY KEY,
                 title boolean,
                 legacy varchar(255),
                 created_at datetime,
                 updated_at datetime
             );",
        )
        .unwrap();

    make_migrations(project.path())
        .success()
        .stdout(predicate::str::contains("add column posts.views integer"))
        .stdout(predicate::str::contains("change column posts.title to string"))
        .stdout(predicate::str::contains("remove column posts.legacy"));

    let files = migration_files(project.path());
    assert_eq!(files.len(), 1);
    assert!(
        files[0].ends_with("_add_views_change_title.sql"),
        "{}",
        files[0]
    );
}
