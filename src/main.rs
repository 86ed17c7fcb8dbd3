//! command-pal: save, search and copy shell commands and links
//!
//! Entries live in a local SQLite key-value database. Commands can be sent
//! to a language model for a safety check and a plain-language explanation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use command_pal::config::{self, AppConfig};
use command_pal::palette::{
    Command, CommandDraft, KeyValueStore, Link, LinkDraft, MemoryKv, SqliteKv, Store,
};

mod commands;

use commands::entry::{self, EditFields};
use commands::list::ListOptions;

type PaletteStore = Store<Box<dyn KeyValueStore>>;

#[derive(Parser)]
#[command(name = "command-pal")]
#[command(about = "Personal launcher for shell commands and links", long_about = None)]
#[command(version)]
struct Cli {
    /// Database file (overrides storage.path from the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Keep everything in memory; nothing is saved
    #[arg(long, global = true, conflicts_with = "db")]
    ephemeral: bool,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage saved shell commands
    #[command(name = "commands", visible_alias = "cmd")]
    Command {
        #[command(subcommand)]
        action: CommandAction,
    },

    /// Manage saved links
    #[command(visible_alias = "link")]
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Run the AI safety check and explanation on arbitrary command text
    Analyze {
        /// Command text to analyze (a trailing --json is read as the flag)
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CommandAction {
    /// List commands, grouped, optionally filtered
    #[command(visible_alias = "ls")]
    List {
        /// Filter by label, command text, category or group
        query: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save a new command
    Add {
        /// Display label (at least 3 characters)
        #[arg(short, long)]
        label: String,

        /// The command text
        #[arg(short, long, allow_hyphen_values = true)]
        command: String,

        /// Category, e.g. git, docker, kubectl
        #[arg(short = 't', long)]
        category: String,

        /// Group heading (default: General)
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Change fields of a saved command
    Edit {
        /// Command id (or a unique prefix)
        id: String,

        #[arg(short, long)]
        label: Option<String>,

        #[arg(short, long, allow_hyphen_values = true)]
        command: Option<String>,

        #[arg(short = 't', long)]
        category: Option<String>,

        /// New group; pass "" to remove it
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Delete a saved command
    #[command(visible_alias = "rm")]
    Delete {
        /// Command id (or a unique prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Copy the command text to the clipboard
    Copy {
        /// Command id (or a unique prefix)
        id: String,
    },

    /// AI safety check and explanation for a saved command
    Explain {
        /// Command id (or a unique prefix)
        id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// List links, grouped, optionally filtered
    #[command(visible_alias = "ls")]
    List {
        /// Filter by label, URL, category or group
        query: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save a new link
    Add {
        /// Display label (at least 3 characters)
        #[arg(short, long)]
        label: String,

        /// Absolute URL
        #[arg(short, long)]
        url: String,

        /// Category, e.g. documentation, frameworks
        #[arg(short = 't', long)]
        category: String,

        /// Group heading (default: General)
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Change fields of a saved link
    Edit {
        /// Link id (or a unique prefix)
        id: String,

        #[arg(short, long)]
        label: Option<String>,

        #[arg(short, long)]
        url: Option<String>,

        #[arg(short = 't', long)]
        category: Option<String>,

        /// New group; pass "" to remove it
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Delete a saved link
    #[command(visible_alias = "rm")]
    Delete {
        /// Link id (or a unique prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Copy the URL to the clipboard
    Copy {
        /// Link id (or a unique prefix)
        id: String,
    },

    /// Open the link in the default browser
    Open {
        /// Link id (or a unique prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print config file and database locations
    Path,

    /// Print the effective configuration (API key redacted)
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .compact()
        .init();

    let cli = Cli::parse();

    let app_config = match AppConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "ignoring unreadable config file");
            AppConfig::default()
        }
    };

    match cli.command {
        Commands::Command { action } => {
            let mut store = open_store(cli.db, cli.ephemeral, &app_config)?;
            run_command_action(action, &mut store, &app_config).await?;
        }
        Commands::Links { action } => {
            let mut store = open_store(cli.db, cli.ephemeral, &app_config)?;
            run_link_action(action, &mut store)?;
        }
        Commands::Analyze { mut command, json } => {
            let json = commands::analyze::take_trailing_json(&mut command) || json;
            let text = command.join(" ");
            let output = commands::analyze::execute(&app_config.llm, &text, json).await?;
            println!("{}", output);
        }
        Commands::Config { action } => {
            run_config_action(action, cli.config, cli.db, &app_config)?
        },
    }

    Ok(())
}

/// Open the palette database, falling back to an in-memory session if the
/// database cannot be opened
fn open_store(
    db: Option<PathBuf>,
    ephemeral: bool,
    app_config: &AppConfig,
) -> Result<PaletteStore> {
    if ephemeral {
        let backend: Box<dyn KeyValueStore> = Box::new(MemoryKv::new());
        return Ok(Store::load(backend));
    }

    let path = match db {
        Some(p) => p,
        None => app_config.db_path()?,
    };

    let backend: Box<dyn KeyValueStore> = match SqliteKv::open(&path) {
        Ok(kv) => Box::new(kv),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "cannot open palette database; changes will not be saved"
            );
            Box::new(MemoryKv::new())
        }
    };
    Ok(Store::load(backend))
}

async fn run_command_action(
    action: CommandAction,
    store: &mut PaletteStore,
    app_config: &AppConfig,
) -> Result<()> {
    match action {
        CommandAction::List { query, json } => {
            let options = ListOptions { query, json };
            println!("{}", commands::list::execute::<Command, _>(store, &options)?);
        }

        CommandAction::Add {
            label,
            command,
            category,
            group,
        } => {
            let draft = CommandDraft::new(label, command, category, group);
            let added = entry::add_command(store, draft)?;
            println!("{}", entry::describe("Added", &added));
        }

        CommandAction::Edit {
            id,
            label,
            command,
            category,
            group,
        } => {
            let fields = EditFields {
                label,
                payload: command,
                category,
                group,
            };
            let updated = entry::edit_command(store, &id, fields)?;
            println!("{}", entry::describe("Updated", &updated));
        }

        CommandAction::Delete { id, yes } => match entry::delete::<Command, _>(store, &id, yes)? {
            Some(deleted) => println!("{}", entry::describe("Deleted", &deleted)),
            None => println!("Nothing deleted."),
        },

        CommandAction::Copy { id } => {
            let text = entry::copy::<Command, _>(store, &id)?;
            println!("{} {}", "Copied to clipboard:".green(), text.dimmed());
        }

        CommandAction::Explain { id, json } => {
            let text = store.resolve::<Command>(&id)?.command.clone();
            let output = commands::analyze::execute(&app_config.llm, &text, json).await?;
            println!("{}", output);
        }
    }

    Ok(())
}

fn run_link_action(action: LinkAction, store: &mut PaletteStore) -> Result<()> {
    match action {
        LinkAction::List { query, json } => {
            let options = ListOptions { query, json };
            println!("{}", commands::list::execute::<Link, _>(store, &options)?);
        }

        LinkAction::Add {
            label,
            url,
            category,
            group,
        } => {
            let draft = LinkDraft::new(label, url, category, group);
            let added = entry::add_link(store, draft)?;
            println!("{}", entry::describe("Added", &added));
        }

        LinkAction::Edit {
            id,
            label,
            url,
            category,
            group,
        } => {
            let fields = EditFields {
                label,
                payload: url,
                category,
                group,
            };
            let updated = entry::edit_link(store, &id, fields)?;
            println!("{}", entry::describe("Updated", &updated));
        }

        LinkAction::Delete { id, yes } => match entry::delete::<Link, _>(store, &id, yes)? {
            Some(deleted) => println!("{}", entry::describe("Deleted", &deleted)),
            None => println!("Nothing deleted."),
        },

        LinkAction::Copy { id } => {
            let url = entry::copy::<Link, _>(store, &id)?;
            println!("{} {}", "Copied to clipboard:".green(), url.dimmed());
        }

        LinkAction::Open { id } => {
            let url = entry::open(store, &id)?;
            println!("Opened {}", url);
        }
    }

    Ok(())
}

fn run_config_action(
    action: ConfigAction,
    config_override: Option<PathBuf>,
    db: Option<PathBuf>,
    app_config: &AppConfig,
) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let config_path = match config_override {
                Some(p) => p,
                None => config::config_path()?,
            };
            let db_path = match db {
                Some(p) => p,
                None => app_config.db_path()?,
            };
            println!("config:   {}", config_path.display());
            println!("database: {}", db_path.display());
        }

        ConfigAction::Show => {
            let mut shown = app_config.clone();
            if shown.llm.api_key.is_some() {
                shown.llm.api_key = Some("<redacted>".to_string());
            }
            let text = toml::to_string_pretty(&shown).context("Failed to render config")?;
            println!("{}", text);
        }
    }

    Ok(())
}
