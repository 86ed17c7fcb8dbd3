//! Command and link palette: records, storage and search

pub mod entity;
pub mod icons;
pub mod kv;
pub mod search;
pub mod seed;
pub mod store;

// Re-exports for library consumers
pub use entity::{Command, CommandDraft, Entity, EntityKind, Link, LinkDraft};
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use search::{project, Projection, DEFAULT_GROUP};
pub use store::{Store, Stored};
