//! Command-line entry
//!
//! Global flags are parsed with clap; everything from the group name on is
//! handed to the registry-driven dispatcher.

pub mod args;

pub use args::{Cli, GlobalFlags, split_global_args};

use crate::app::{Application, Mode};
use crate::client::{ClientContext, HttpTransport};
use crate::config::ConfigStore;
use crate::dispatch::{DispatchOutcome, StdoutPresenter, help};
use crate::error::{PlexusError, Result};
use crate::error_suggestions::{ErrorSuggestions, suggest_name};
use crate::permission::CliRefusal;
use crate::project_identity;
use crate::ui as output;
use crate::utils::paths;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

/// Run one invocation and return the process exit code.
pub fn run<I>(argv: I) -> i32
where
    I: IntoIterator<Item = String>,
{
    let argv: Vec<String> = argv.into_iter().collect();
    let (prefix, tokens) = split_global_args(&argv);

    let cli = match Cli::try_parse_from(&prefix) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { 1 } else { 0 };
        }
    };

    output::set_quiet(cli.global.quiet);
    output::set_verbose(cli.global.verbose);
    init_logging(cli.global.verbose);

    match execute(&cli.global, &tokens) {
        Ok(()) => 0,
        Err(e) => {
            output::error(&e.display_with_suggestion());
            e.exit_code()
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(project_identity::log_env_key())
        .unwrap_or_else(|_| EnvFilter::new(default));
    // A second call in the same process keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn config_path(flags: &GlobalFlags) -> Result<std::path::PathBuf> {
    match &flags.config {
        Some(path) => paths::normalize(path),
        None => ConfigStore::default_path(),
    }
}

fn execute(flags: &GlobalFlags, tokens: &[String]) -> Result<()> {
    let path = config_path(flags)?;
    output::verbose(&format!("Config file: {}", path.display()));
    let config = ConfigStore::bootstrap(
        path,
        |key| std::env::var(key).ok(),
        flags.overlay(),
    );
    let transport = HttpTransport::from_config(&config)?;
    let context = ClientContext::new(config, Box::new(transport));
    let mut app = Application::with_default_groups(context, Mode::Cli)?.enforce_permissions(CliRefusal);

    let width = help::terminal_width();
    if flags.help || tokens.is_empty() {
        let mut command = Cli::command().after_help(help::render_group_list(app.registry(), width));
        println!("{}", command.render_help());
        return Ok(());
    }

    let presenter = StdoutPresenter::new(flags.output_mode());
    match app.dispatch(tokens, &presenter) {
        Ok(DispatchOutcome::Completed) => Ok(()),
        Ok(DispatchOutcome::Help(text)) => {
            print!("{}", text);
            Ok(())
        }
        Err(e @ (PlexusError::MissingAction { .. } | PlexusError::UnknownAction { .. })) => {
            eprintln!("{}", help::render_group(app.registry(), &tokens[0], width));
            if let PlexusError::UnknownAction { action, .. } = &e
                && let Some(hint) = suggest_name(
                    action,
                    app.registry().find_actions(&tokens[0]).iter().map(|a| a.name.as_str()),
                )
            {
                eprintln!("{}\n", hint);
            }
            Err(e)
        }
        Err(PlexusError::UnknownGroup(group)) => {
            if let Some(hint) = suggest_name(&group, app.registry().groups().iter().map(|g| g.name.as_str())) {
                eprintln!("{}", hint);
            }
            Err(PlexusError::UnknownGroup(group))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        std::iter::once("plexus")
            .chain(tokens.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn version_exits_zero() {
        assert_eq!(run(argv(&["--version"])), 0);
    }

    #[test]
    fn unknown_global_flag_fails() {
        assert_eq!(run(argv(&["--bogus", "jobs", "list"])), 1);
    }
}
