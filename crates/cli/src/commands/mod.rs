//! CLI subcommands.

pub mod dataset;
pub mod probe;
pub mod queue;
