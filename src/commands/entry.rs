//! Add, edit, delete, copy and open saved entries

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::utils;
use command_pal::error::StoreError;
use command_pal::palette::{
    Command, CommandDraft, Entity, KeyValueStore, Link, LinkDraft, Store, Stored,
};

/// Field replacements for an edit; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct EditFields {
    pub label: Option<String>,
    /// Command text or URL
    pub payload: Option<String>,
    pub category: Option<String>,
    /// An empty string removes the group
    pub group: Option<String>,
}

impl EditFields {
    fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.payload.is_none()
            && self.category.is_none()
            && self.group.is_none()
    }

    fn apply(
        self,
        label: &mut String,
        payload: &mut String,
        category: &mut String,
        group: &mut Option<String>,
    ) {
        if let Some(v) = self.label {
            *label = v;
        }
        if let Some(v) = self.payload {
            *payload = v;
        }
        if let Some(v) = self.category {
            *category = v;
        }
        if let Some(v) = self.group {
            *group = Some(v);
        }
    }
}

pub fn add_command<B: KeyValueStore>(store: &mut Store<B>, draft: CommandDraft) -> Result<Command> {
    draft.validate()?;
    Ok(store.add::<Command>(draft))
}

pub fn add_link<B: KeyValueStore>(store: &mut Store<B>, draft: LinkDraft) -> Result<Link> {
    draft.validate()?;
    Ok(store.add::<Link>(draft))
}

pub fn edit_command<B: KeyValueStore>(
    store: &mut Store<B>,
    id: &str,
    fields: EditFields,
) -> Result<Command> {
    let current = store.resolve::<Command>(id)?.clone();
    if fields.is_empty() {
        return Ok(current);
    }

    let mut draft = current.to_draft();
    fields.apply(
        &mut draft.label,
        &mut draft.command,
        &mut draft.category,
        &mut draft.group,
    );
    draft.validate()?;

    let updated = Command::from_draft(current.id, draft);
    store.update(updated.clone())?;
    Ok(updated)
}

pub fn edit_link<B: KeyValueStore>(
    store: &mut Store<B>,
    id: &str,
    fields: EditFields,
) -> Result<Link> {
    let current = store.resolve::<Link>(id)?.clone();
    if fields.is_empty() {
        return Ok(current);
    }

    let mut draft = current.to_draft();
    fields.apply(
        &mut draft.label,
        &mut draft.url,
        &mut draft.category,
        &mut draft.group,
    );
    draft.validate()?;

    let updated = Link::from_draft(current.id, draft);
    store.update(updated.clone())?;
    Ok(updated)
}

/// Delete an entry, asking first unless `yes`
///
/// Returns the deleted entry, or `None` if nothing matched or the user
/// declined. An unknown id is not an error.
pub fn delete<E: Stored, B: KeyValueStore>(
    store: &mut Store<B>,
    id: &str,
    yes: bool,
) -> Result<Option<E>> {
    let entity = match store.resolve::<E>(id) {
        Ok(entity) => entity.clone(),
        Err(StoreError::NotFound { .. }) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if !yes {
        let question = format!("Delete {} '{}'?", E::KIND, entity.label());
        if !utils::confirm(&question)? {
            return Ok(None);
        }
    }

    store.delete::<E>(entity.id());
    Ok(Some(entity))
}

/// Copy an entry's command text or URL to the clipboard
pub fn copy<E: Stored, B: KeyValueStore>(store: &Store<B>, id: &str) -> Result<String> {
    let payload = store.resolve::<E>(id)?.payload().to_string();
    utils::copy_to_clipboard(&payload).context("Failed to copy to clipboard")?;
    Ok(payload)
}

/// Open a link in the browser
pub fn open<B: KeyValueStore>(store: &Store<B>, id: &str) -> Result<String> {
    let url = store.resolve::<Link>(id)?.url.clone();
    utils::open_url(&url).with_context(|| format!("Failed to open {}", url))?;
    Ok(url)
}

/// One-line summary printed after a change
pub fn describe<E: Entity>(verb: &str, entity: &E) -> String {
    format!(
        "{} {} {} {}",
        verb.green(),
        E::KIND,
        utils::short_id(entity.id()).dimmed(),
        entity.label().bold()
    )
}
