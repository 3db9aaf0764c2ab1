//! CLI argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// modelsync - generate schema migrations from declared models
#[derive(Parser, Debug)]
#[command(name = "modelsync")]
#[command(version)]
#[command(about = "modelsync - generate schema migrations from declared models", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new modelsync project
    Init(InitArgs),

    /// Compare declared models with the database and write a migration
    #[command(alias = "make_migrations")]
    MakeMigrations(MakeMigrationsArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Init Command
// =============================================================================

/// Arguments for the `init` command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to initialize the project (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Database provider to use
    #[arg(short, long, default_value = "sqlite")]
    pub provider: DatabaseProvider,

    /// Database connection URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

/// Supported database providers
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    Postgresql,
    Mysql,
    #[default]
    Sqlite,
}

impl std::fmt::Display for DatabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseProvider::Postgresql => write!(f, "postgresql"),
            DatabaseProvider::Mysql => write!(f, "mysql"),
            DatabaseProvider::Sqlite => write!(f, "sqlite"),
        }
    }
}

// =============================================================================
// Make Migrations Command
// =============================================================================

/// Arguments for the `make-migrations` command
#[derive(Args, Debug)]
pub struct MakeMigrationsArgs {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Database URL, overriding the configuration file
    #[arg(long, env = "MODELSYNC_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Print the migration instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_make_migrations_alias() {
        let cli = Cli::try_parse_from(["modelsync", "make_migrations", "--dry-run"]).unwrap();
        match cli.command {
            Command::MakeMigrations(args) => assert!(args.dry_run),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_defaults() {
        let cli = Cli::try_parse_from(["modelsync", "init"]).unwrap();
        match cli.command {
            Command::Init(args) => {
                assert_eq!(args.path, PathBuf::from("."));
                assert_eq!(args.provider, DatabaseProvider::Sqlite);
                assert!(!args.force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["modelsync", "version", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
