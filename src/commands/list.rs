//! List command - Show saved commands or links, grouped and filtered

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;

use super::utils;
use command_pal::palette::icons::category_icon;
use command_pal::palette::{project, Entity, EntityKind, KeyValueStore, Projection, Store, Stored};

/// Options for the list command
pub struct ListOptions {
    /// Free-text filter (matches label, payload, category, group)
    pub query: Option<String>,
    /// Print the grouped result as JSON
    pub json: bool,
}

fn payload_header(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Command => "Command",
        EntityKind::Link => "URL",
    }
}

/// Execute the list command and return formatted output
pub fn execute<E: Stored, B: KeyValueStore>(
    store: &Store<B>,
    options: &ListOptions,
) -> Result<String> {
    let items = store.list::<E>();
    let query = options.query.as_deref().unwrap_or("");
    let projection = project(items, query);

    if options.json {
        return Ok(serde_json::to_string_pretty(&projection)?);
    }

    Ok(format_projection(&projection, items.len(), query))
}

/// Render one table per group, in projection order
pub fn format_projection<E: Entity>(
    projection: &Projection<'_, E>,
    total: usize,
    query: &str,
) -> String {
    let kind = E::KIND;
    if projection.is_empty() {
        return format!("No {}s found.", kind);
    }

    let mut sections = Vec::new();
    for group in projection.groups() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("ID"),
            Cell::new("Label"),
            Cell::new(payload_header(kind)),
            Cell::new("Category"),
        ]);

        for entity in &group.entries {
            table.add_row(vec![
                Cell::new(utils::short_id(entity.id())),
                Cell::new(format!(
                    "{} {}",
                    category_icon(kind, entity.category()),
                    entity.label()
                )),
                Cell::new(entity.payload()),
                Cell::new(entity.category()),
            ]);
        }

        sections.push(format!("{}\n{}", group.name.to_uppercase().bold(), table));
    }

    let mut output = sections.join("\n\n");
    let shown = projection.len();
    if query.is_empty() {
        output.push_str(&format!("\n\n{} {}s found", shown, kind));
    } else {
        output.push_str(&format!(
            "\n\n{} of {} {}s match '{}'",
            shown, total, kind, query
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_pal::palette::{Command, Link, MemoryKv};

    fn options(query: Option<&str>, json: bool) -> ListOptions {
        ListOptions {
            query: query.map(Into::into),
            json,
        }
    }

    #[test]
    fn test_lists_seed_commands() {
        let store = Store::load(MemoryKv::new());
        let output = execute::<Command, _>(&store, &options(None, false)).unwrap();
        assert!(output.contains("POD MANAGEMENT"));
        assert!(output.contains("kubectl get pods -A"));
        assert!(output.contains(&format!("{} commands found", Command::seed().len())));
    }

    #[test]
    fn test_query_filters_and_counts() {
        let store = Store::load(MemoryKv::new());
        let output = execute::<Command, _>(&store, &options(Some("docker"), false)).unwrap();
        assert!(output.contains("docker ps"));
        assert!(!output.contains("git status"));
        assert!(output.contains("match 'docker'"));
    }

    #[test]
    fn test_no_match_message() {
        let store = Store::load(MemoryKv::new());
        let output = execute::<Link, _>(&store, &options(Some("zzz-nothing"), false)).unwrap();
        assert_eq!(output, "No links found.");
    }

    #[test]
    fn test_json_output_keeps_group_order() {
        let store = Store::load(MemoryKv::new());
        let output = execute::<Link, _>(&store, &options(None, true)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        let groups = json.as_array().unwrap();
        assert_eq!(groups[0]["name"], "Reference");
        assert_eq!(groups[0]["entries"][0]["url"], "https://doc.rust-lang.org/std/");
    }
}
