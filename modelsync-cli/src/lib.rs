//! modelsync CLI - Command-line interface for modelsync.
//!
//! This crate provides the CLI tool for managing modelsync projects:
//! project initialization and migration generation from declared models.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod store;
