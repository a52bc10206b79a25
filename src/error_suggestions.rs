//! Error suggestions and helpful messages
//!
//! Provides actionable hints for the errors users hit most often

use crate::config::ConfigKey;
use crate::error::PlexusError;
use crate::project_identity::cli_with;
use colored::Colorize;

/// Extension trait to add suggestions to errors
pub trait ErrorSuggestions {
    /// Get a helpful suggestion for this error
    fn suggestion(&self) -> Option<String>;

    /// Display the error with its suggestion
    fn display_with_suggestion(&self) -> String;
}

impl ErrorSuggestions for PlexusError {
    fn suggestion(&self) -> Option<String> {
        match self {
            PlexusError::MissingGroup { name: None } => Some(format!(
                "Select a group with '{}' or set {}",
                cli_with("config set-group <name>").cyan(),
                ConfigKey::Group.env_var().cyan()
            )),
            PlexusError::MissingGroup { name: Some(_) } => Some(format!(
                "Check the group name with '{}'",
                cli_with("groups list").cyan()
            )),
            PlexusError::PermissionRefused { .. } => {
                Some("Destructive actions only run when confirmed with --yes".to_string())
            }
            PlexusError::ResourceNotFound { kind, .. } if kind == "Job" => Some(format!(
                "List the jobs of the active group with '{}'",
                cli_with("jobs list").cyan()
            )),
            PlexusError::UnknownGroup(_) => Some(format!(
                "Run '{}' to see the available command groups",
                cli_with("--help").cyan()
            )),
            PlexusError::Transport(msg) => {
                if msg.contains("401") || msg.contains("403") {
                    Some(format!(
                        "Check your API token: {} or {}",
                        cli_with("config set-token <token>").cyan(),
                        ConfigKey::ApiToken.env_var().cyan()
                    ))
                } else {
                    Some(format!(
                        "Check the API endpoint with '{}'",
                        cli_with("config show").cyan()
                    ))
                }
            }
            _ => None,
        }
    }

    fn display_with_suggestion(&self) -> String {
        let base_msg = format!("{}", self);

        if let Some(suggestion) = self.suggestion() {
            format!("{}\n\n{}", base_msg.red().bold(), suggestion)
        } else {
            base_msg.red().bold().to_string()
        }
    }
}

/// Closest candidate to a mistyped group or action name
pub fn suggest_name<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let (closest, dist) = candidates
        .into_iter()
        .map(|c| (c, levenshtein_distance(input, c)))
        .min_by_key(|(_, d)| *d)?;

    // Exact matches and far-off names get no suggestion
    if dist > 0 && dist <= 3 {
        Some(format!("Did you mean: {}?", closest.cyan()))
    } else {
        None
    }
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b.chars().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}
