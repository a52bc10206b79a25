//! On-disk config format (`~/.plexus/config.json`)

use super::GroupRecord;
use crate::error::{PlexusError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Serialized shape of the config file.
///
/// Fields are declared in key order so the file is written with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "api-token", default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupRecord>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Config file not found at '{0}'")]
    NotFound(PathBuf),

    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load_from_file(path: &Path) -> std::result::Result<ConfigFile, LoadError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    serde_json::from_str(&content).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Render the file contents: 2-space indent, sorted keys, trailing newline.
pub fn render(file: &ConfigFile) -> Result<String> {
    let mut content = serde_json::to_string_pretty(file)?;
    content.push('\n');
    Ok(content)
}

pub fn write_to(path: &Path, file: &ConfigFile) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PlexusError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let content = render(file)?;
    fs::write(path, content).map_err(|e| PlexusError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}
