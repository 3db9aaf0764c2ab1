//! modelsync CLI - Command-line interface for modelsync.

use clap::Parser;
use miette::Diagnostic;

use modelsync_cli::cli::{Cli, Command};
use modelsync_cli::commands;
use modelsync_cli::error::CliResult;
use modelsync_cli::{logging, output};

fn main() {
    // Run the CLI and handle errors
    if let Err(e) = run() {
        output::newline();
        output::error(&e.to_string());
        if let Some(help) = e.help() {
            output::dim(&help.to_string());
        }
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Run the appropriate command
    match cli.command {
        Command::Init(args) => commands::init::run(args),
        Command::MakeMigrations(args) => commands::make_migrations::run(args),
        Command::Version => commands::version::run(),
    }
}
