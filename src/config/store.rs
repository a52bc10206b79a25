use super::file::{self, ConfigFile, LoadError};
use super::{ConfigKey, GroupRecord, GroupResolver};
use crate::error::{PlexusError, Result};
use crate::utils::paths;
use std::path::{Path, PathBuf};

/// One independent source of configuration values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub endpoint: Option<String>,
    pub api_token: Option<String>,
    pub group: Option<String>,
}

impl Overlay {
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        let value = match key {
            ConfigKey::Endpoint => &self.endpoint,
            ConfigKey::ApiToken => &self.api_token,
            ConfigKey::Group => &self.group,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: ConfigKey, value: Option<String>) {
        let slot = match key {
            ConfigKey::Endpoint => &mut self.endpoint,
            ConfigKey::ApiToken => &mut self.api_token,
            ConfigKey::Group => &mut self.group,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        ConfigKey::ALL.iter().all(|key| self.get(*key).is_none())
    }
}

/// Layered configuration store.
///
/// Values are never stored resolved: every read walks the overlays in
/// precedence order (user input, environment, file) for that one property.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    from_file: Overlay,
    from_env: Overlay,
    from_user_input: Overlay,
    /// Last known full record of the active group (id, displayName)
    known_group: Option<GroupRecord>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            from_file: Overlay::default(),
            from_env: Overlay::default(),
            from_user_input: Overlay::default(),
            known_group: None,
        }
    }

    /// Build the process snapshot: file at rest, then environment, then
    /// explicit user input.
    ///
    /// This is the only place where an unreadable or malformed file
    /// collapses to "no file present".
    pub fn bootstrap<F>(path: impl Into<PathBuf>, env: F, user_input: Overlay) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut store = Self::new(path);

        match file::load_from_file(&store.path) {
            Ok(contents) => store.apply_file(contents),
            Err(LoadError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
            }
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
            }
        }

        store.load_from_env(env);
        store.apply_user_input(user_input);
        store
    }

    /// Default location: `~/.plexus/config.json`
    pub fn default_path() -> Result<PathBuf> {
        paths::config_file()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file overlay with the contents of a loaded config file.
    pub fn apply_file(&mut self, contents: ConfigFile) {
        self.from_file = Overlay {
            endpoint: contents.endpoint,
            api_token: contents.api_token,
            group: contents.group.as_ref().map(|g| g.name.clone()),
        };
        if let Some(group) = contents.group
            && (group.id.is_some() || group.display_name.is_some())
        {
            self.known_group = Some(group);
        }
    }

    /// Read the three `PLEXUS_*` variables; empty values leave the overlay
    /// untouched.
    pub fn load_from_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ConfigKey::ALL {
            if let Some(value) = lookup(&key.env_var()).filter(|v| !v.is_empty()) {
                self.from_env.set(key, Some(value));
            }
        }
    }

    pub fn apply_user_input(&mut self, input: Overlay) {
        for key in ConfigKey::ALL {
            if let Some(value) = input.get(key) {
                self.set(key, value.to_string());
            }
        }
    }

    /// Resolved value for one property, or `None` if no overlay has it.
    pub fn resolve(&self, key: ConfigKey) -> Option<&str> {
        self.from_user_input
            .get(key)
            .or_else(|| self.from_env.get(key))
            .or_else(|| self.from_file.get(key))
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.resolve(ConfigKey::Endpoint)
    }

    pub fn api_token(&self) -> Option<&str> {
        self.resolve(ConfigKey::ApiToken)
    }

    pub fn group_name(&self) -> Option<&str> {
        self.resolve(ConfigKey::Group)
    }

    /// Write into the user-input overlay only.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into();
        if key == ConfigKey::Group
            && let Some(known) = self.known_group.as_mut()
            && known.name != value
        {
            // The cached id and display name describe the previous group.
            *known = GroupRecord::named(value.clone());
        }
        self.from_user_input.set(key, Some(value));
    }

    /// The active group as currently known; name-only until resolved.
    pub fn current_group(&self) -> Option<GroupRecord> {
        let name = self.group_name()?;
        match &self.known_group {
            Some(known) if known.name == name => Some(known.clone()),
            _ => Some(GroupRecord::named(name)),
        }
    }

    /// Record a fully resolved group as the cache for its name.
    pub fn remember_group(&mut self, record: GroupRecord) {
        self.known_group = Some(record);
    }

    /// Resolve the active group name into a full record if it lacks an id.
    ///
    /// A failed lookup leaves the group name-only and reports
    /// `MissingGroup`.
    pub fn resolve_current_group(&mut self, resolver: &dyn GroupResolver) -> Result<GroupRecord> {
        let current = self
            .current_group()
            .ok_or(PlexusError::MissingGroup { name: None })?;
        if current.is_resolved() {
            return Ok(current);
        }

        match resolver.resolve_group(&current.name) {
            Ok(mut record) if record.is_resolved() => {
                record.name = current.name;
                self.known_group = Some(record.clone());
                Ok(record)
            }
            Ok(_) => Err(PlexusError::MissingGroup {
                name: Some(current.name),
            }),
            Err(e) => {
                tracing::debug!(group = %current.name, error = %e, "group lookup failed");
                Err(PlexusError::MissingGroup {
                    name: Some(current.name),
                })
            }
        }
    }

    /// The active group, only if its id is known.
    pub fn active_group(&self) -> Result<GroupRecord> {
        match self.current_group() {
            Some(group) if group.is_resolved() => Ok(group),
            Some(group) => Err(PlexusError::MissingGroup {
                name: Some(group.name),
            }),
            None => Err(PlexusError::MissingGroup { name: None }),
        }
    }

    /// Computed values in their on-disk shape
    pub fn to_file(&self) -> ConfigFile {
        ConfigFile {
            api_token: self.api_token().map(str::to_string),
            endpoint: self.endpoint().map(str::to_string),
            group: self.current_group(),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&self.path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        file::write_to(path, &self.to_file())?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
