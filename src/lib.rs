//! command-pal library
//!
//! A personal launcher for shell commands and bookmarked links: a
//! write-through entity store over a local key-value database, a grouped
//! search view, and an AI-backed safety check and explanation for commands.

pub mod config;
pub mod error;
pub mod insight;
pub mod palette;
