use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlexusError {
    /// No active group could be resolved for a group-scoped operation
    #[error("No active group is configured (current: {})", .name.as_deref().unwrap_or("none"))]
    MissingGroup { name: Option<String> },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Malformed validation schema text
    #[error("Invalid validation schema at line {line}: {message}")]
    InvalidSchema { line: usize, message: String },

    #[error("{kind} not found ({key_type}: {key})")]
    ResourceNotFound {
        kind: String,
        key: String,
        key_type: String,
    },

    #[error("'{action}' requires confirmation. Re-run with --yes to proceed.")]
    PermissionRefused { action: String },

    #[error("'{action}' produced no result")]
    MissingReturnValue { action: String },

    #[error("Unknown command group '{0}'")]
    UnknownGroup(String),

    #[error("Missing action for command group '{group}'")]
    MissingAction { group: String },

    #[error("Unknown action '{action}' for command group '{group}'")]
    UnknownAction { group: String, action: String },

    #[error("{0}")]
    Usage(String),

    /// Network-level failure talking to the API
    #[error("Request failed: {0}")]
    Transport(String),

    /// Error reported inside a GraphQL response body
    #[error("API error: {0}")]
    Graphql(String),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    YamlError(#[from] serde_yml::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("{0}")]
    Other(String),
}

impl PlexusError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(
        kind: impl Into<String>,
        key: impl Into<String>,
        key_type: impl Into<String>,
    ) -> Self {
        Self::ResourceNotFound {
            kind: kind.into(),
            key: key.into(),
            key_type: key_type.into(),
        }
    }

    /// Process exit code for this error. Every handled failure exits with 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<reqwest::Error> for PlexusError {
    fn from(e: reqwest::Error) -> Self {
        PlexusError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlexusError>;
