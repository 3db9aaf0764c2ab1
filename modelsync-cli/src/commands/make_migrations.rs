//! `modelsync make-migrations` command - Generate a migration from model changes.

use std::path::{Path, PathBuf};

use modelsync_migrate::{
    ComparisonOutcome, MigrationBuilder, MigrationError, MigrationFileManager, MigrationRenderer,
    ModelSummary, SchemaComparator, SchemaIntrospector,
};
use tracing::info;

use crate::cli::MakeMigrationsArgs;
use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::CliResult;
use crate::models::load_models;
use crate::output::{self, success, warn};
use crate::store::open_store;

/// Run the make-migrations command
pub fn run(args: MakeMigrationsArgs) -> CliResult<()> {
    output::header("Make Migrations");

    let config_path = match args.config {
        Some(path) => path,
        None => std::env::current_dir()?.join(CONFIG_FILE_NAME),
    };
    let config = Config::load(&config_path)?;
    let root = project_root(&config_path);
    let migration_config = config.migration_config(&root);

    output::kv("Config", &config_path.display().to_string());
    output::kv("Models", &migration_config.models_dir.display().to_string());
    output::kv(
        "Migrations",
        &migration_config.migrations_dir.display().to_string(),
    );
    output::newline();

    output::step(1, 4, "Connecting to database...");
    let url = args.database_url.or(config.database.url.clone());
    let store = match open_store(&config.database.provider, url.as_deref(), &root) {
        Ok(store) => store,
        Err(e) if e.is_recoverable() => {
            warn(&format!("{}. Nothing to compare.", e));
            output::info("No changes detected");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    output::step(2, 4, "Loading models...");
    let registry = load_models(&migration_config.models_dir, store.family())?;
    output::kv("Loaded", &format!("{} model(s)", registry.len()));

    output::step(3, 4, "Comparing models to database...");
    let comparator = SchemaComparator::new(&registry, &migration_config)
        .with_introspector(&store)
        .with_history(&store);
    let observer = |summary: &ModelSummary| output::model_summary(summary);

    let changes = match comparator.compare_all(Some(&observer))? {
        ComparisonOutcome::Gated { pending } => {
            output::newline();
            warn("Pending migrations detected:");
            for file in &pending {
                output::list_item(&file.file_name());
            }
            output::dim("Apply the pending migrations, then run make-migrations again");
            return Err(MigrationError::PendingMigrations(
                pending.iter().map(|f| f.file_name()).collect(),
            )
            .into());
        }
        ComparisonOutcome::Changes(changes) => changes,
    };

    if changes.is_empty() {
        output::newline();
        output::info("No changes detected");
        return Ok(());
    }

    output::step(4, 4, "Generating migration...");
    let unit = MigrationBuilder::new(&store).build(&changes)?;
    for op in &unit.operations {
        output::operation(op);
    }

    let renderer = config.migrations.format.renderer(store.family());
    output::newline();

    if args.dry_run {
        output::section(&format!(
            "{}.{} (dry run)",
            unit.file_stem(),
            renderer.extension()
        ));
        output::code(&renderer.render(&unit)?);
        return Ok(());
    }

    let manager = MigrationFileManager::new(&migration_config.migrations_dir);
    let path = manager.write_migration(&unit, renderer.as_ref())?;
    info!(path = %path.display(), name = %unit.name(), "Migration written");

    success(&format!("Created migration {}", display_relative(&path, &root)));
    output::dim(&format!("Class name: {}", unit.class_name()));

    Ok(())
}

fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
