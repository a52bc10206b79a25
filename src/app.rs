//! Application bootstrap: groups, registry and permission gate wired
//! around one client context.

use crate::client::ClientContext;
use crate::commands;
use crate::dispatch::{Call, CommandGroup, DispatchOutcome, Dispatcher, Presenter};
use crate::error::{PlexusError, Result};
use crate::permission::{PermissionGate, RefusalHandler};
use crate::registry::{CONFIRM_OPTION, CommandRegistry};
use serde_json::Value;

/// How the application is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Scripted use: inert permission gate, config changes stay in memory
    Library,
    /// Command line: enforced gate, config setters persist to disk
    Cli,
}

pub struct Application {
    registry: CommandRegistry,
    groups: Vec<Box<dyn CommandGroup>>,
    gate: PermissionGate,
    context: ClientContext,
}

impl Application {
    /// Register every group's actions and capture the gated set.
    pub fn new(context: ClientContext, groups: Vec<Box<dyn CommandGroup>>) -> Result<Self> {
        let mut registry = CommandRegistry::new();
        for group in &groups {
            registry.register_group(group.name(), group.about());
            group.declare(&mut registry.scope(group.name()));
        }
        registry.verify_gated_actions()?;

        let gate = PermissionGate::from_registry(&registry);
        tracing::debug!(
            groups = registry.groups().len(),
            gated = registry.gated_actions().len(),
            "command registry built"
        );

        Ok(Self {
            registry,
            groups,
            gate,
            context,
        })
    }

    /// Application with the built-in command groups
    pub fn with_default_groups(context: ClientContext, mode: Mode) -> Result<Self> {
        Self::new(context, commands::default_groups(mode))
    }

    pub fn enforce_permissions(mut self, handler: impl RefusalHandler + 'static) -> Self {
        self.gate = self.gate.enforcing(handler);
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ClientContext {
        &mut self.context
    }

    /// CLI path: bind raw tokens and route the result to `presenter`.
    pub fn dispatch(&mut self, tokens: &[String], presenter: &dyn Presenter) -> Result<DispatchOutcome> {
        Dispatcher::new(&self.registry, &self.groups, &self.gate, presenter)
            .dispatch(&mut self.context, tokens)
    }

    /// SDK path: invoke an action with already-typed arguments.
    ///
    /// Options not given in `call` take their declared defaults; undeclared
    /// option names are rejected, as on the command line. The result is
    /// returned as-is, without result routing.
    pub fn call(&mut self, group: &str, action: &str, call: Call) -> Result<Option<Value>> {
        let target = self
            .groups
            .iter()
            .find(|g| g.name() == group)
            .ok_or_else(|| PlexusError::UnknownGroup(group.to_string()))?;
        let descriptor = self
            .registry
            .find_action(group, action)
            .ok_or_else(|| PlexusError::UnknownAction {
                group: group.to_string(),
                action: action.to_string(),
            })?;

        if call.positionals().len() != descriptor.positionals.len() {
            return Err(PlexusError::Usage(format!(
                "'{} {}' takes {} argument(s), got {}",
                group,
                action,
                descriptor.positionals.len(),
                call.positionals().len()
            )));
        }

        let mut merged = Call::defaults_for(descriptor);
        for value in call.positionals() {
            merged = merged.arg(value.clone());
        }
        for (name, value) in call.options() {
            if descriptor.option(name).is_none() {
                return Err(PlexusError::Usage(format!(
                    "Unknown option '--{}' for '{}'",
                    name, descriptor.name
                )));
            }
            merged = merged.with_option(name, value.clone());
        }
        if call.is_confirmed() || call.flag(CONFIRM_OPTION) {
            merged = merged.confirm();
        }
        if !descriptor.accepts_options {
            merged.drop_options();
        }

        let context = &mut self.context;
        self.gate.guard(
            group,
            &descriptor.method,
            Some(descriptor),
            merged.is_confirmed(),
            || target.invoke(context, &descriptor.method, &merged),
        )
    }
}
