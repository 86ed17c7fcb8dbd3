//! Command and link records
//!
//! Both kinds share the same shape: an opaque id, a label, one payload field
//! (the command text or the URL), a category and an optional group.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;

/// Minimum label length, counted in characters
pub const MIN_LABEL_LEN: usize = 3;

/// Which collection an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Command,
    Link,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Link => "link",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Behaviour shared by commands and links
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// The record without its id, as submitted by the user
    type Draft;

    const KIND: EntityKind;

    /// Key of this collection in the key-value backend
    const STORAGE_KEY: &'static str;

    fn from_draft(id: String, draft: Self::Draft) -> Self;

    fn id(&self) -> &str;
    fn label(&self) -> &str;

    /// The command text or the URL
    fn payload(&self) -> &str;
    fn category(&self) -> &str;
    fn group(&self) -> Option<&str>;

    /// Built-in collection used when nothing usable is persisted
    fn seed() -> Vec<Self>;
}

/// A saved shell command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub label: String,
    pub command: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "no_group")]
    pub group: Option<String>,
}

/// A command before an id has been assigned
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandDraft {
    pub label: String,
    pub command: String,
    pub category: String,
    pub group: Option<String>,
}

impl CommandDraft {
    pub fn new(
        label: impl Into<String>,
        command: impl Into<String>,
        category: impl Into<String>,
        group: Option<String>,
    ) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
            category: category.into(),
            group: normalize_group(group),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_label(&self.label)?;
        if self.command.is_empty() {
            return Err(ValidationError::EmptyCommand);
        }
        validate_category(&self.category)
    }
}

impl Command {
    /// The editable fields of this command
    pub fn to_draft(&self) -> CommandDraft {
        CommandDraft {
            label: self.label.clone(),
            command: self.command.clone(),
            category: self.category.clone(),
            group: self.group.clone(),
        }
    }
}

impl Entity for Command {
    type Draft = CommandDraft;

    const KIND: EntityKind = EntityKind::Command;
    const STORAGE_KEY: &'static str = "commands";

    fn from_draft(id: String, draft: CommandDraft) -> Self {
        Self {
            id,
            label: draft.label,
            command: draft.command,
            category: draft.category,
            group: normalize_group(draft.group),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn payload(&self) -> &str {
        &self.command
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn group(&self) -> Option<&str> {
        self.group.as_deref().filter(|g| !g.is_empty())
    }

    fn seed() -> Vec<Self> {
        super::seed::commands()
    }
}

/// A bookmarked URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub label: String,
    pub url: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "no_group")]
    pub group: Option<String>,
}

/// A link before an id has been assigned
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkDraft {
    pub label: String,
    pub url: String,
    pub category: String,
    pub group: Option<String>,
}

impl LinkDraft {
    pub fn new(
        label: impl Into<String>,
        url: impl Into<String>,
        category: impl Into<String>,
        group: Option<String>,
    ) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            category: category.into(),
            group: normalize_group(group),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_label(&self.label)?;
        // Url::parse only accepts absolute URLs
        Url::parse(&self.url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        validate_category(&self.category)
    }
}

impl Link {
    /// The editable fields of this link
    pub fn to_draft(&self) -> LinkDraft {
        LinkDraft {
            label: self.label.clone(),
            url: self.url.clone(),
            category: self.category.clone(),
            group: self.group.clone(),
        }
    }
}

impl Entity for Link {
    type Draft = LinkDraft;

    const KIND: EntityKind = EntityKind::Link;
    const STORAGE_KEY: &'static str = "links";

    fn from_draft(id: String, draft: LinkDraft) -> Self {
        Self {
            id,
            label: draft.label,
            url: draft.url,
            category: draft.category,
            group: normalize_group(draft.group),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn payload(&self) -> &str {
        &self.url
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn group(&self) -> Option<&str> {
        self.group.as_deref().filter(|g| !g.is_empty())
    }

    fn seed() -> Vec<Self> {
        super::seed::links()
    }
}

/// Treat an empty group the same as no group
fn normalize_group(group: Option<String>) -> Option<String> {
    group.filter(|g| !g.is_empty())
}

fn no_group(group: &Option<String>) -> bool {
    group.as_deref().is_none_or(str::is_empty)
}

fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.chars().count() < MIN_LABEL_LEN {
        return Err(ValidationError::LabelTooShort { min: MIN_LABEL_LEN });
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    Ok(())
}
