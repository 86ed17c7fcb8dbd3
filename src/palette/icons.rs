//! Category badges shown next to entries

use super::entity::EntityKind;

const COMMAND_ICONS: &[(&str, &str)] = &[
    ("git", "⎇"),
    ("docker", "▣"),
    ("npm", "◆"),
    ("system", "⚙"),
    ("kubectl", "☸"),
];

const LINK_ICONS: &[(&str, &str)] = &[
    ("documentation", "▤"),
    ("frameworks", "⟨⟩"),
    ("styling", "⟨⟩"),
    ("ai", "✦"),
];

/// Glyph for `category`, falling back to a generic one per kind
pub fn category_icon(kind: EntityKind, category: &str) -> &'static str {
    let (table, fallback) = match kind {
        EntityKind::Command => (COMMAND_ICONS, "⚙"),
        EntityKind::Link => (LINK_ICONS, "◎"),
    };
    let category = category.to_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, icon)| *icon)
        .unwrap_or(fallback)
}
