//! Central project identity contract.
//!
//! Single source of truth for binary name, config locations and the
//! environment variable prefix.

pub const BINARY_NAME: &str = "plexus";
pub const CONFIG_DIR_NAME: &str = ".plexus";
pub const CONFIG_FILE_BASENAME: &str = "config.json";
pub const ENV_PREFIX: &str = "PLEXUS";
pub const DEFAULT_ENDPOINT: &str = "https://api.plexus.dev/graphql";
pub const USER_AGENT: &str = concat!("plexus-cli/", env!("CARGO_PKG_VERSION"));

pub fn env_key(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}

pub fn cli_with(args: &str) -> String {
    format!("{} {}", BINARY_NAME, args)
}

/// Env var holding the tracing filter directive
pub fn log_env_key() -> String {
    env_key("LOG")
}
