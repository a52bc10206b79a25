use crate::error::{PlexusError, Result};
use crate::project_identity::{CONFIG_DIR_NAME, CONFIG_FILE_BASENAME};
use directories::UserDirs;
use std::path::{Path, PathBuf};

pub fn home_dir() -> Result<PathBuf> {
    let user_dirs = UserDirs::new()
        .ok_or_else(|| PlexusError::PathError("Could not determine user home directory".into()))?;
    Ok(user_dirs.home_dir().to_path_buf())
}

pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home = home_dir()?;

    if path_str == "~" {
        return Ok(home);
    }

    let stripped = path_str
        .strip_prefix("~/")
        .ok_or_else(|| PlexusError::PathError(format!("Invalid path format: {}", path_str)))?;

    Ok(home.join(stripped))
}

/// Expand `~` and anchor relative paths at the current directory.
///
/// Used for upload/download arguments so the API collaborator always
/// receives an absolute location regardless of where the CLI was started.
pub fn normalize(path: &Path) -> Result<PathBuf> {
    let expanded = expand_home(path)?;
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    let cwd = std::env::current_dir().map_err(|e| PlexusError::IoError {
        path: PathBuf::from("."),
        source: e,
    })?;
    Ok(cwd.join(expanded))
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(CONFIG_DIR_NAME))
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_BASENAME))
}
