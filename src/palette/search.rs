//! Search and grouping view
//!
//! Filters a collection by a free-text query and partitions the matches by
//! group. Recomputed on every query; collections are small enough that no
//! index is kept.

use serde::Serialize;

use super::entity::Entity;

/// Group name for entities without one
pub const DEFAULT_GROUP: &str = "General";

/// Matching entities that share a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group<'a, E> {
    pub name: String,
    pub entries: Vec<&'a E>,
}

/// Grouped search result, groups in first-seen order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Projection<'a, E> {
    groups: Vec<Group<'a, E>>,
}

impl<'a, E> Projection<'a, E> {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of matching entities across all groups
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn groups(&self) -> &[Group<'a, E>] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&[&'a E]> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.entries.as_slice())
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }
}

/// Does any searchable field of `entity` contain `needle` (already lowercased)?
fn matches<E: Entity>(entity: &E, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(entity.label())
        || contains(entity.payload())
        || contains(entity.category())
        || entity.group().is_some_and(contains)
}

/// Filter `items` by `query` and group the matches
///
/// Matching is a case-insensitive substring test against label, payload,
/// category and group. An empty query matches everything.
pub fn project<'a, E: Entity>(items: &'a [E], query: &str) -> Projection<'a, E> {
    let needle = query.to_lowercase();
    let mut groups: Vec<Group<'a, E>> = Vec::new();

    for entity in items.iter().filter(|e| matches(*e, &needle)) {
        let name = entity.group().unwrap_or(DEFAULT_GROUP);
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.entries.push(entity),
            None => groups.push(Group {
                name: name.to_string(),
                entries: vec![entity],
            }),
        }
    }

    Projection { groups }
}
