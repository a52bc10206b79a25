//! Layered client configuration
//!
//! Endpoint, API token and active group are each resolved independently
//! from three overlays: explicit user input, environment, and the config
//! file at rest (in that order of precedence).

pub mod file;
pub mod store;

pub use file::{ConfigFile, LoadError, load_from_file};
pub use store::{ConfigStore, Overlay};

use crate::error::Result;
use crate::project_identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolvable configuration property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Endpoint,
    ApiToken,
    Group,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [ConfigKey::Endpoint, ConfigKey::ApiToken, ConfigKey::Group];

    /// Environment variable overriding this property
    pub fn env_var(&self) -> String {
        match self {
            ConfigKey::Endpoint => project_identity::env_key("API_ENDPOINT"),
            ConfigKey::ApiToken => project_identity::env_key("API_TOKEN"),
            ConfigKey::Group => project_identity::env_key("GROUP"),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKey::Endpoint => write!(f, "endpoint"),
            ConfigKey::ApiToken => write!(f, "api-token"),
            ConfigKey::Group => write!(f, "group"),
        }
    }
}

/// The richer form of the active group, as known to the API.
///
/// Fields are declared in key order so the config file is written with
/// sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl GroupRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            display_name: None,
            id: None,
            name: name.into(),
        }
    }

    /// A group is usable for scoped operations only once its id is known.
    pub fn is_resolved(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Side-channel lookup turning a bare group name into a full record.
pub trait GroupResolver {
    fn resolve_group(&self, name: &str) -> Result<GroupRecord>;
}

impl<F> GroupResolver for F
where
    F: Fn(&str) -> Result<GroupRecord>,
{
    fn resolve_group(&self, name: &str) -> Result<GroupRecord> {
        self(name)
    }
}
