//! Shared utilities for commands

use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Number of id characters shown in listings
pub const SHORT_ID_LEN: usize = 8;

/// Shorten an id for display
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Clipboard programs to try, in order, with their arguments
type ClipboardTool = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Copy `text` to the system clipboard using the platform clipboard tool
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    for (program, args) in CLIPBOARD_TOOLS {
        let child = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        // Tool not installed, try the next one
        let Ok(mut child) = child else {
            continue;
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .with_context(|| format!("Failed to write to {}", program))?;
        }

        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {}", program))?;
        if status.success() {
            return Ok(());
        }
        tracing::debug!(program, %status, "clipboard tool failed");
    }

    let names: Vec<&str> = CLIPBOARD_TOOLS.iter().map(|(p, _)| *p).collect();
    bail!("No working clipboard tool found (tried: {})", names.join(", "))
}

/// Open `url` in the default browser
pub fn open_url(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let mut cmd = {
        let mut c = Command::new("open");
        c.arg(url);
        c
    };

    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut cmd = {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    let status = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("Failed to launch browser")?;
    if !status.success() {
        bail!("Browser opener exited with {}", status);
    }
    Ok(())
}

/// Ask a yes/no question on stdin; anything but "y" is no
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} (y/N) ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
