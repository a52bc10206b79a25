//! # Command Registry
//!
//! Explicit table of command groups and the actions each one declares.
//! Built once at bootstrap (one fresh instance per test) and shared by
//! reference with the dispatcher, the permission gate and help rendering.
//!
//! Actions are keyed by `(group, action-name)`. Registering an action name
//! a second time in the same group replaces the earlier descriptor in place,
//! keeping its position in the listing order. This is how a command group
//! swaps a memory-only action for a persisting variant.

mod descriptor;

pub use descriptor::{
    ActionBuilder, ActionDescriptor, ArgSpec, CONFIRM_OPTION, FlagKind, OptionSpec, ValueType,
};

use crate::error::{PlexusError, Result};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub name: String,
    pub about: String,
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    groups: Vec<GroupInfo>,
    actions: HashMap<String, Vec<ActionDescriptor>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_group(&mut self, name: impl Into<String>, about: impl Into<String>) {
        let name = name.into();
        let about = about.into();
        match self.groups.iter_mut().find(|g| g.name == name) {
            Some(existing) => existing.about = about,
            None => self.groups.push(GroupInfo { name, about }),
        }
    }

    /// Register an action under a group, replacing a same-named one in place.
    pub fn register(&mut self, group: &str, descriptor: ActionDescriptor) {
        if self.group(group).is_none() {
            self.register_group(group, "");
        }

        let actions = self.actions.entry(group.to_string()).or_default();
        match actions.iter_mut().find(|a| a.name == descriptor.name) {
            Some(existing) => {
                tracing::trace!(group, action = %descriptor.name, "overriding action");
                *existing = descriptor;
            }
            None => actions.push(descriptor),
        }
    }

    /// Registration handle scoped to one group
    pub fn scope(&mut self, group: &str) -> ActionSet<'_> {
        ActionSet {
            registry: self,
            group: group.to_string(),
        }
    }

    pub fn groups(&self) -> &[GroupInfo] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&GroupInfo> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// All actions of a group in registration order
    pub fn find_actions(&self, group: &str) -> &[ActionDescriptor] {
        self.actions.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Exact action lookup; `None` when unknown
    pub fn find_action(&self, group: &str, name: &str) -> Option<&ActionDescriptor> {
        self.find_actions(group).iter().find(|a| a.name == name)
    }

    pub fn find_by_method(&self, group: &str, method: &str) -> Option<&ActionDescriptor> {
        self.find_actions(group).iter().find(|a| a.method == method)
    }

    /// Qualified `group.method` names of every permission-gated action
    pub fn gated_actions(&self) -> BTreeSet<String> {
        self.groups
            .iter()
            .flat_map(|g| {
                self.find_actions(&g.name)
                    .iter()
                    .filter(|a| a.requires_permission)
                    .map(move |a| qualified_name(&g.name, &a.method))
            })
            .collect()
    }

    /// Every gated action must accept options so `--yes` can reach it.
    pub fn verify_gated_actions(&self) -> Result<()> {
        for group in &self.groups {
            for action in self.find_actions(&group.name) {
                if action.requires_permission && !action.accepts_options {
                    return Err(PlexusError::Other(format!(
                        "Action '{} {}' requires confirmation but does not accept options",
                        group.name, action.name
                    )));
                }
            }
        }
        Ok(())
    }
}

pub fn qualified_name(group: &str, method: &str) -> String {
    format!("{}.{}", group, method)
}

pub struct ActionSet<'a> {
    registry: &'a mut CommandRegistry,
    group: String,
}

impl ActionSet<'_> {
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn add(&mut self, descriptor: ActionDescriptor) -> &mut Self {
        self.registry.register(&self.group, descriptor);
        self
    }
}
