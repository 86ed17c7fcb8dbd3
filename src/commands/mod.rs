//! CLI commands

pub mod analyze;
pub mod entry;
pub mod list;
pub mod utils;
