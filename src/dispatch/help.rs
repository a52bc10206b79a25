//! Help text rendered from the registry on demand

use crate::project_identity::BINARY_NAME;
use crate::registry::{ActionDescriptor, CommandRegistry};
use terminal_size::{Width, terminal_size};

const DEFAULT_WIDTH: usize = 80;

pub fn terminal_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
        .clamp(40, 120)
}

pub fn render_overview(registry: &CommandRegistry, width: usize) -> String {
    format!(
        "Usage: {} [OPTIONS] <GROUP> <ACTION> [ARGS]...\n\n{}",
        BINARY_NAME,
        render_group_list(registry, width)
    )
}

/// Group table plus the pointer to per-group help
pub fn render_group_list(registry: &CommandRegistry, width: usize) -> String {
    let mut out = String::from("Command groups:\n");
    let rows: Vec<(String, String)> = registry
        .groups()
        .iter()
        .map(|g| (g.name.clone(), g.about.clone()))
        .collect();
    push_table(&mut out, &rows, width);
    out.push_str(&format!(
        "\nRun '{} <GROUP> --help' to list the actions of a group.\n",
        BINARY_NAME
    ));
    out
}

pub fn render_group(registry: &CommandRegistry, group: &str, width: usize) -> String {
    let mut out = format!("Usage: {} {} <ACTION> [ARGS]...\n", BINARY_NAME, group);
    if let Some(info) = registry.group(group)
        && !info.about.is_empty()
    {
        out.push('\n');
        out.push_str(&wrap(&info.about, width).join("\n"));
        out.push('\n');
    }

    out.push_str("\nActions:\n");
    let rows: Vec<(String, String)> = registry
        .find_actions(group)
        .iter()
        .map(|a| {
            let mut about = a.description.clone();
            if a.requires_permission {
                about.push_str(" (requires --yes)");
            }
            (a.name.clone(), about)
        })
        .collect();
    push_table(&mut out, &rows, width);
    out
}

pub fn render_action(group: &str, descriptor: &ActionDescriptor, width: usize) -> String {
    let mut out = format!("Usage: {}\n", descriptor.usage(group));
    if !descriptor.description.is_empty() {
        out.push('\n');
        out.push_str(&wrap(&descriptor.description, width).join("\n"));
        out.push('\n');
    }

    if !descriptor.positionals.is_empty() {
        out.push_str("\nArguments:\n");
        let rows: Vec<(String, String)> = descriptor
            .positionals
            .iter()
            .map(|a| (format!("<{}>", a.name), a.help.clone()))
            .collect();
        push_table(&mut out, &rows, width);
    }

    out.push_str("\nOptions:\n");
    let mut rows: Vec<(String, String)> = descriptor
        .optionals
        .iter()
        .map(|o| {
            let flag = match o.kind.metavar() {
                Some(metavar) => format!("{} {}", o.flag(), metavar),
                None => o.flag(),
            };
            (flag, o.help.clone())
        })
        .collect();
    rows.push(("-h, --help".to_string(), "Show this help".to_string()));
    push_table(&mut out, &rows, width);
    out
}

fn push_table(out: &mut String, rows: &[(String, String)], width: usize) {
    let left = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let indent = 2 + left + 4;
    for (key, text) in rows {
        let lines = wrap(text, width.saturating_sub(indent).max(20));
        let first = lines.first().map(String::as_str).unwrap_or("");
        out.push_str(&format!("  {:<left$}    {}\n", key, first, left = left));
        for line in lines.iter().skip(1) {
            out.push_str(&format!("{:indent$}{}\n", "", line, indent = indent));
        }
    }
}

/// Greedy word wrap
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
