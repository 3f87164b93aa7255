//! CLI subcommands.

pub mod holiday;
pub mod migrate;
