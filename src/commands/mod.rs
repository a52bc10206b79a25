//! Built-in command groups
//!
//! Each group is a thin layer over fixed GraphQL documents. The interesting
//! work (binding, gating, routing) happens in the dispatcher.

pub mod config;
pub mod groups;
pub mod jobs;

use crate::app::Mode;
use crate::dispatch::CommandGroup;

pub fn default_groups(mode: Mode) -> Vec<Box<dyn CommandGroup>> {
    vec![
        Box::new(config::ConfigCommands::new(mode == Mode::Cli)),
        Box::new(groups::GroupCommands),
        Box::new(jobs::JobCommands::new()),
    ]
}
