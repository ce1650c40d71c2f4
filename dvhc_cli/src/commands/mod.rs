//! CLI subcommand implementations.

pub mod build;
pub mod catalog;
pub mod lookup;
