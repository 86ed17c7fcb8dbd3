//! Built-in starter collections

use super::entity::{Command, Link};

fn command(id: &str, label: &str, text: &str, category: &str, group: &str) -> Command {
    Command {
        id: id.to_string(),
        label: label.to_string(),
        command: text.to_string(),
        category: category.to_string(),
        group: Some(group.to_string()),
    }
}

fn link(id: &str, label: &str, url: &str, category: &str, group: &str) -> Link {
    Link {
        id: id.to_string(),
        label: label.to_string(),
        url: url.to_string(),
        category: category.to_string(),
        group: Some(group.to_string()),
    }
}

/// Starter commands, newest first
pub fn commands() -> Vec<Command> {
    vec![
        command("seed-cmd-1", "List all pods", "kubectl get pods -A", "kubectl", "Pod Management"),
        command(
            "seed-cmd-2",
            "Describe a pod",
            "kubectl describe pod <pod-name>",
            "kubectl",
            "Pod Management",
        ),
        command(
            "seed-cmd-3",
            "Follow pod logs",
            "kubectl logs -f <pod-name>",
            "kubectl",
            "Pod Management",
        ),
        command("seed-cmd-4", "Show git status", "git status -sb", "git", "Version Control"),
        command(
            "seed-cmd-5",
            "Pretty git log",
            "git log --oneline --graph --decorate",
            "git",
            "Version Control",
        ),
        command(
            "seed-cmd-6",
            "Undo last commit (keep changes)",
            "git reset --soft HEAD~1",
            "git",
            "Version Control",
        ),
        command("seed-cmd-7", "List running containers", "docker ps", "docker", "Containers"),
        command(
            "seed-cmd-8",
            "Remove dangling images",
            "docker image prune -f",
            "docker",
            "Containers",
        ),
        command("seed-cmd-9", "Install dependencies", "npm install", "npm", "Node"),
        command("seed-cmd-10", "Disk usage summary", "df -h", "system", "System"),
    ]
}

/// Starter links, newest first
pub fn links() -> Vec<Link> {
    vec![
        link(
            "seed-link-1",
            "Rust standard library",
            "https://doc.rust-lang.org/std/",
            "documentation",
            "Reference",
        ),
        link(
            "seed-link-2",
            "MDN Web Docs",
            "https://developer.mozilla.org/",
            "documentation",
            "Reference",
        ),
        link("seed-link-3", "Next.js docs", "https://nextjs.org/docs", "frameworks", "Web"),
        link(
            "seed-link-4",
            "Tailwind CSS",
            "https://tailwindcss.com/docs",
            "styling",
            "Web",
        ),
        link(
            "seed-link-5",
            "Gemini API docs",
            "https://ai.google.dev/gemini-api/docs",
            "ai",
            "AI",
        ),
    ]
}
