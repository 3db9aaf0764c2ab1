//! CLI command implementations.

pub mod init;
pub mod make_migrations;
pub mod version;
