//! Entity store
//!
//! Owns the command and link collections for the session. Every successful
//! mutation writes the whole affected collection back to the key-value
//! backend. Backend failures are logged and otherwise ignored: the in-memory
//! collections stay authoritative until the process exits.

use tracing::{debug, warn};
use uuid::Uuid;

use super::entity::{Command, Entity, Link};
use super::kv::KeyValueStore;
use crate::error::StoreError;

/// The two collections, newest entry first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collections {
    commands: Vec<Command>,
    links: Vec<Link>,
}

/// Maps an entity kind to its slot in [`Collections`]
pub trait Stored: Entity {
    fn slot(collections: &Collections) -> &Vec<Self>;
    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self>;
}

impl Stored for Command {
    fn slot(collections: &Collections) -> &Vec<Self> {
        &collections.commands
    }

    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.commands
    }
}

impl Stored for Link {
    fn slot(collections: &Collections) -> &Vec<Self> {
        &collections.links
    }

    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.links
    }
}

/// In-memory collections with write-through persistence
pub struct Store<B: KeyValueStore> {
    backend: B,
    collections: Collections,
}

impl<B: KeyValueStore> Store<B> {
    /// Read both collections from `backend`, substituting seed data for any
    /// collection that is missing, unreadable or empty
    ///
    /// Seed data is not written back until the collection is next mutated.
    pub fn load(backend: B) -> Self {
        let collections = Collections {
            commands: load_collection(&backend),
            links: load_collection(&backend),
        };
        Self {
            backend,
            collections,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current collection, newest first
    pub fn list<E: Stored>(&self) -> &[E] {
        E::slot(&self.collections)
    }

    pub fn get<E: Stored>(&self, id: &str) -> Option<&E> {
        self.list::<E>().iter().find(|e| e.id() == id)
    }

    /// Find an entity by exact id, or by an unambiguous id prefix
    pub fn resolve<E: Stored>(&self, id_or_prefix: &str) -> Result<&E, StoreError> {
        if let Some(entity) = self.get::<E>(id_or_prefix) {
            return Ok(entity);
        }

        let not_found = || StoreError::NotFound {
            kind: E::KIND.as_str(),
            id: id_or_prefix.to_string(),
        };
        if id_or_prefix.is_empty() {
            return Err(not_found());
        }

        let mut matches = self
            .list::<E>()
            .iter()
            .filter(|e| e.id().starts_with(id_or_prefix));
        match (matches.next(), matches.count()) {
            (None, _) => Err(not_found()),
            (Some(entity), 0) => Ok(entity),
            (Some(_), rest) => Err(StoreError::Ambiguous {
                kind: E::KIND.as_str(),
                prefix: id_or_prefix.to_string(),
                count: rest + 1,
            }),
        }
    }

    /// Assign a fresh id to `draft` and prepend it to its collection
    pub fn add<E: Stored>(&mut self, draft: E::Draft) -> E {
        let id = self.fresh_id::<E>();
        let entity = E::from_draft(id, draft);
        E::slot_mut(&mut self.collections).insert(0, entity.clone());
        debug!(kind = %E::KIND, id = entity.id(), "added");
        self.persist::<E>();
        entity
    }

    /// Replace the stored entity with the same id, keeping its position
    pub fn update<E: Stored>(&mut self, entity: E) -> Result<(), StoreError> {
        let items = E::slot_mut(&mut self.collections);
        let Some(slot) = items.iter_mut().find(|e| e.id() == entity.id()) else {
            return Err(StoreError::NotFound {
                kind: E::KIND.as_str(),
                id: entity.id().to_string(),
            });
        };
        debug!(kind = %E::KIND, id = entity.id(), "updated");
        *slot = entity;
        self.persist::<E>();
        Ok(())
    }

    /// Remove the entity with `id`; returns false (and writes nothing) when
    /// there is no such entity
    pub fn delete<E: Stored>(&mut self, id: &str) -> bool {
        let items = E::slot_mut(&mut self.collections);
        let before = items.len();
        items.retain(|e| e.id() != id);
        if items.len() == before {
            return false;
        }
        debug!(kind = %E::KIND, id, "deleted");
        self.persist::<E>();
        true
    }

    fn fresh_id<E: Stored>(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get::<E>(&id).is_none() {
                return id;
            }
        }
    }

    fn persist<E: Stored>(&mut self) {
        let items = E::slot(&self.collections);
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(e) => {
                warn!(kind = %E::KIND, error = %e, "failed to serialize collection");
                return;
            }
        };
        if let Err(e) = self.backend.set(E::STORAGE_KEY, &json) {
            warn!(
                kind = %E::KIND,
                error = %e,
                "failed to persist collection; changes kept for this session only"
            );
        }
    }
}

fn load_collection<E: Entity, B: KeyValueStore>(backend: &B) -> Vec<E> {
    let raw = match backend.get(E::STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(kind = %E::KIND, "no saved collection, using seed data");
            return E::seed();
        }
        Err(e) => {
            warn!(kind = %E::KIND, error = %e, "failed to read saved collection, using seed data");
            return E::seed();
        }
    };

    match serde_json::from_str::<Vec<E>>(&raw) {
        Ok(items) if items.is_empty() => {
            debug!(kind = %E::KIND, "saved collection is empty, using seed data");
            E::seed()
        }
        Ok(items) => items,
        Err(e) => {
            warn!(kind = %E::KIND, error = %e, "saved collection is corrupt, using seed data");
            E::seed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::palette::entity::{CommandDraft, LinkDraft};
    use crate::palette::kv::{MemoryKv, SqliteKv};
    use crate::palette::search::{project, DEFAULT_GROUP};
    use std::collections::HashSet;

    /// Backend whose reads and writes always fail
    struct BrokenKv;

    impl KeyValueStore for BrokenKv {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Err(PersistenceError::Unavailable("disk on fire".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("quota exceeded".into()))
        }
    }

    fn pods_command() -> Command {
        Command {
            id: "1".into(),
            label: "List pods".into(),
            command: "kubectl get pods".into(),
            category: "kubectl".into(),
            group: Some("Pod Management".into()),
        }
    }

    fn backend_with_commands(commands: &[Command]) -> MemoryKv {
        let mut kv = MemoryKv::new();
        kv.set("commands", &serde_json::to_string(commands).unwrap())
            .unwrap();
        kv
    }

    #[test]
    fn test_load_missing_uses_seed_without_writing() {
        let store = Store::load(MemoryKv::new());
        assert_eq!(store.list::<Command>(), Command::seed().as_slice());
        assert_eq!(store.list::<Link>(), Link::seed().as_slice());
        assert_eq!(store.backend().get("commands").unwrap(), None);
        assert_eq!(store.backend().get("links").unwrap(), None);
    }

    #[test]
    fn test_load_corrupt_or_empty_uses_seed() {
        let mut kv = MemoryKv::new();
        kv.set("commands", "{not json").unwrap();
        kv.set("links", "[]").unwrap();

        let store = Store::load(kv);
        assert_eq!(store.list::<Command>(), Command::seed().as_slice());
        assert_eq!(store.list::<Link>(), Link::seed().as_slice());
        // Nothing rewritten
        assert_eq!(
            store.backend().get("commands").unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_load_read_failure_uses_seed() {
        let store = Store::load(BrokenKv);
        assert_eq!(store.list::<Command>().len(), Command::seed().len());
    }

    #[test]
    fn test_load_existing_snapshot() {
        let store = Store::load(backend_with_commands(&[pods_command()]));
        assert_eq!(store.list::<Command>(), &[pods_command()]);
        // Links were never saved, so they still come from the seed
        assert_eq!(store.list::<Link>(), Link::seed().as_slice());
    }

    #[test]
    fn test_add_prepends_and_persists() {
        let mut store = Store::load(backend_with_commands(&[pods_command()]));
        let added = store.add::<Command>(CommandDraft::new(
            "Show nodes",
            "kubectl get nodes",
            "kubectl",
            None,
        ));

        let list = store.list::<Command>();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], added);
        assert_eq!(list[1], pods_command());

        let saved: Vec<Command> =
            serde_json::from_str(&store.backend().get("commands").unwrap().unwrap()).unwrap();
        assert_eq!(saved, list);
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut store = Store::load(MemoryKv::new());
        for i in 0..50 {
            let existing: HashSet<String> =
                store.list::<Link>().iter().map(|l| l.id.clone()).collect();
            let link = store.add::<Link>(LinkDraft::new(
                format!("Link {i}"),
                format!("https://example.com/{i}"),
                "documentation",
                None,
            ));
            assert!(!existing.contains(&link.id));
        }
        let ids: HashSet<_> = store.list::<Link>().iter().map(|l| &l.id).collect();
        assert_eq!(ids.len(), store.list::<Link>().len());
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut store = Store::load(MemoryKv::new());
        let mut second = store.list::<Command>()[1].clone();
        second.label = "Renamed".into();
        second.group = None;

        store.update(second.clone()).unwrap();
        assert_eq!(store.list::<Command>()[1], second);
        assert_eq!(store.list::<Command>().len(), Command::seed().len());

        // Update persisted the whole collection
        let saved: Vec<Command> =
            serde_json::from_str(&store.backend().get("commands").unwrap().unwrap()).unwrap();
        assert_eq!(saved[1].label, "Renamed");
    }

    #[test]
    fn test_blank_group_falls_into_default() {
        let mut kv = MemoryKv::new();
        kv.set(
            "commands",
            r#"[{"id":"1","label":"Uptime","command":"uptime","category":"system","group":""}]"#,
        )
        .unwrap();
        let store = Store::load(kv);
        let projection = project(store.list::<Command>(), "");
        assert_eq!(projection.group_names().collect::<Vec<_>>(), vec!["General"]);
    }

    #[test]
    fn test_update_with_blank_group_is_ungrouped() {
        let mut store = Store::load(MemoryKv::new());
        let mut first = store.list::<Command>()[0].clone();
        first.group = Some(String::new());
        store.update(first).unwrap();

        let raw = store.backend().get("commands").unwrap().unwrap();
        assert!(!raw.contains(r#""group":"""#));

        let projection = project(store.list::<Command>(), "");
        assert!(!projection.group_names().any(|name| name.is_empty()));
        assert!(projection.group(DEFAULT_GROUP).is_some());
    }

    #[test]
    fn test_update_missing_reports_not_found() {
        let mut store = Store::load(backend_with_commands(&[pods_command()]));
        let mut ghost = pods_command();
        ghost.id = "nope".into();

        let err = store.update(ghost).unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                kind: "command",
                id: "nope".into()
            }
        );
        assert_eq!(store.list::<Command>(), &[pods_command()]);
    }

    #[test]
    fn test_delete_existing_and_missing() {
        let mut store = Store::load(backend_with_commands(&[pods_command()]));
        let before = store.list::<Command>().to_vec();

        assert!(!store.delete::<Command>("does-not-exist"));
        assert_eq!(store.list::<Command>(), before.as_slice());

        assert!(store.delete::<Command>("1"));
        assert!(store.list::<Command>().is_empty());
        assert_eq!(
            store.backend().get("commands").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut store = Store::load(BrokenKv);
        let added = store.add::<Command>(CommandDraft::new("Echo hi", "echo hi", "system", None));
        assert_eq!(store.list::<Command>()[0], added);
        assert!(store.delete::<Command>(&added.id));
    }

    #[test]
    fn test_round_trip_through_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("palette.db");

        let (commands, links) = {
            let mut store = Store::load(SqliteKv::open(&path).unwrap());
            let a = store.add::<Command>(CommandDraft::new("First one", "true", "system", None));
            store.add::<Command>(CommandDraft::new(
                "Second one",
                "false",
                "system",
                Some("Misc".into()),
            ));
            let mut edited = a.clone();
            edited.command = "true && true".into();
            store.update(edited).unwrap();
            let seed_id = Command::seed()[0].id.clone();
            store.delete::<Command>(&seed_id);
            store.add::<Link>(LinkDraft::new("Crates", "https://crates.io", "documentation", None));
            (
                store.list::<Command>().to_vec(),
                store.list::<Link>().to_vec(),
            )
        };

        let reloaded = Store::load(SqliteKv::open(&path).unwrap());
        assert_eq!(reloaded.list::<Command>(), commands.as_slice());
        assert_eq!(reloaded.list::<Link>(), links.as_slice());
    }

    #[test]
    fn test_resolve_by_prefix() {
        let mut a = pods_command();
        a.id = "abc123".into();
        let mut b = pods_command();
        b.id = "abd456".into();
        let store = Store::load(backend_with_commands(&[a.clone(), b.clone()]));

        assert_eq!(store.resolve::<Command>("abc123").unwrap(), &a);
        assert_eq!(store.resolve::<Command>("abd").unwrap(), &b);
        assert_eq!(
            store.resolve::<Command>("ab").unwrap_err(),
            StoreError::Ambiguous {
                kind: "command",
                prefix: "ab".into(),
                count: 2
            }
        );
        assert!(matches!(
            store.resolve::<Command>("zzz"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.resolve::<Command>("").is_err());
    }
}
