pub mod app;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod error_suggestions;
pub mod payload;
pub mod permission;
pub mod project_identity;
pub mod registry;
pub mod ui;
pub mod utils;
pub mod validation;

pub use app::{Application, Mode};
pub use dispatch::Call;
pub use error::{PlexusError, Result};

use std::process::exit;

/// Run plexus CLI entrypoint.
pub fn run_cli() {
    // Colour settings first, before anything is printed
    ui::init_colors();

    // Ctrl-C ends wait loops and log streams with the last observed state
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        ui::mark_interrupted();
        ui::warning("Operation cancelled by user.");
    }) {
        ui::warning(&format!("Could not install Ctrl-C handler: {}", e));
    }

    exit(cli::run(std::env::args()));
}
