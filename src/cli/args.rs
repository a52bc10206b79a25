use crate::config::{ConfigKey, Overlay};
use crate::dispatch::OutputMode;
use clap::{ArgAction, CommandFactory, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "plexus",
    about = "Command-line client for the Plexus job platform",
    long_about = "Manage groups and jobs on the Plexus platform through its GraphQL API",
    version,
    override_usage = "plexus [OPTIONS] <GROUP> <ACTION> [ARGS]...",
    disable_help_flag = true,
    next_line_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,
}

#[derive(Parser, Debug, Default)]
pub struct GlobalFlags {
    /// Use this config file instead of ~/.plexus/config.json
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API endpoint for this invocation
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// API token for this invocation
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Active group for this invocation
    #[arg(long, value_name = "NAME")]
    pub group: Option<String>,

    /// Print results as JSON instead of a tree
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Print help
    #[arg(short = 'h', long, action = ArgAction::SetTrue)]
    pub help: bool,
}

impl GlobalFlags {
    /// Flag values as the explicit user-input overlay
    pub fn overlay(&self) -> Overlay {
        let mut overlay = Overlay::default();
        overlay.set(ConfigKey::Endpoint, self.endpoint.clone());
        overlay.set(ConfigKey::ApiToken, self.token.clone());
        overlay.set(ConfigKey::Group, self.group.clone());
        overlay
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Tree
        }
    }
}

/// Split argv into the global-flag prefix (program name included) and the
/// `<GROUP> <ACTION> [ARGS]...` tokens.
///
/// Global flags must come before the group name. The first token that is
/// not a known global flag or its value starts the group tokens; unknown
/// dashed tokens stay in the prefix so clap reports them.
pub fn split_global_args(argv: &[String]) -> (Vec<String>, Vec<String>) {
    let mut command = Cli::command();
    command.build();

    let takes_value = |token: &str| -> Option<bool> {
        command.get_arguments().find_map(|arg| {
            let matches = match token.strip_prefix("--") {
                Some(long) => arg.get_long() == Some(long),
                None => token
                    .strip_prefix('-')
                    .and_then(|s| s.chars().last())
                    .is_some_and(|c| arg.get_short() == Some(c)),
            };
            matches.then(|| arg.get_action().takes_values())
        })
    };

    let mut prefix: Vec<String> = argv.iter().take(1).cloned().collect();
    let mut iter = argv.iter().skip(1).enumerate();

    while let Some((index, token)) = iter.next() {
        if token == "--" || !token.starts_with('-') || token == "-" {
            let rest_start = index + 1 + usize::from(token == "--");
            return (prefix, argv[rest_start..].to_vec());
        }

        prefix.push(token.clone());
        if token.contains('=') {
            continue;
        }
        if takes_value(token) == Some(true)
            && let Some((_, value)) = iter.next()
        {
            prefix.push(value.clone());
        }
    }

    (prefix, Vec::new())
}
