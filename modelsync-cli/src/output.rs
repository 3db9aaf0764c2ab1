//! Styled terminal output utilities.

use modelsync_migrate::{ModelSummary, Operation};
use owo_colors::OwoColorize;

/// Print a header/title
pub fn header(text: &str) {
    println!();
    println!("{}", text.bold().cyan());
    println!("{}", "─".repeat(text.chars().count()).dimmed());
    println!();
}

/// Print a section header
pub fn section(text: &str) {
    println!("{}", text.bold().white());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print an info message
pub fn info(text: &str) {
    println!("{} {}", "ℹ".blue().bold(), text);
}

/// Print a warning message
pub fn warn(text: &str) {
    println!("{} {}", "⚠".yellow().bold(), text.yellow());
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a step indicator
pub fn step(current: usize, total: usize, text: &str) {
    println!("{} {}", format!("[{}/{}]", current, total).dimmed(), text);
}

/// Print a list item
pub fn list_item(text: &str) {
    println!("  {} {}", "•".dimmed(), text);
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Print dimmed text
pub fn dim(text: &str) {
    println!("{}", text.dimmed());
}

/// Print a block of generated code
pub fn code(code: &str) {
    println!();
    for line in code.lines() {
        println!("  {}", line.bright_white());
    }
    println!();
}

/// Print the changes found for one model
pub fn model_summary(summary: &ModelSummary) {
    println!(
        "{} {}",
        summary.model.bold(),
        format!("({})", summary.table).dimmed()
    );
    for name in &summary.add {
        println!("  {} {}", "+".green().bold(), name.green());
    }
    for name in &summary.change {
        println!("  {} {}", "~".yellow().bold(), name.yellow());
    }
    for name in &summary.remove {
        println!("  {} {}", "-".red().bold(), name.red());
    }
}

/// Print one planned operation
pub fn operation(op: &Operation) {
    let marker = match op {
        Operation::CreateTable { .. } | Operation::AddColumn { .. } => "+".green().to_string(),
        Operation::ChangeColumn { .. } => "~".yellow().to_string(),
        Operation::RemoveColumn { .. } => "-".red().to_string(),
        Operation::AddIndex { .. } | Operation::AddForeignKey { .. } => "+".cyan().to_string(),
    };
    println!("  {} {}", marker, op.describe());
}
