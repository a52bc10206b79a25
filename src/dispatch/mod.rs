//! # Command Dispatcher
//!
//! Resolves `<group> <action> [args...]` against the registry and runs the
//! bound method of the owning command group.
//!
//! Per invocation:
//!
//! 1. **Group selection**: unknown group is a usage error.
//! 2. **Action selection**: unknown action is an error (group help is shown
//!    by the caller); `-h`/`--help` in place of the action shows group help.
//! 3. **Argument binding**: positionals in declaration order, options by
//!    flag. With no tokens after the action the binder is skipped and the
//!    action runs with option defaults.
//! 4. **Permission check**: gated actions need `--yes` when enforced.
//! 5. **Invocation** of the group's method.
//! 6. **Result routing**: non-empty results go to the presenter; an empty
//!    result from a `return_required` action is `MissingReturnValue`.

pub mod binding;
pub mod help;
pub mod output;

pub use binding::{Binding, bind};
pub use output::{OutputMode, Presenter, StdoutPresenter, has_content};

use crate::client::ClientContext;
use crate::error::{PlexusError, Result};
use crate::permission::PermissionGate;
use crate::registry::{ActionDescriptor, ActionSet, CommandRegistry};
use serde_json::{Map, Value};

/// A named cluster of related actions (one per resource area).
pub trait CommandGroup {
    fn name(&self) -> &'static str;

    fn about(&self) -> &'static str;

    /// Register this group's actions
    fn declare(&self, actions: &mut ActionSet<'_>);

    /// Run the method bound to an action. `Ok(None)` means no output.
    fn invoke(&self, ctx: &mut ClientContext, method: &str, call: &Call) -> Result<Option<Value>>;
}

/// Error for a method name a group does not implement
pub fn unknown_method(group: &str, method: &str) -> PlexusError {
    PlexusError::Other(format!("Command group '{}' has no method '{}'", group, method))
}

/// Bound arguments of one action invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    positionals: Vec<Value>,
    options: Map<String, Value>,
    confirmed: bool,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(positionals: Vec<Value>, options: Map<String, Value>, confirmed: bool) -> Self {
        Self {
            positionals,
            options,
            confirmed,
        }
    }

    /// Call carrying only the declared option defaults
    pub fn defaults_for(descriptor: &ActionDescriptor) -> Self {
        Self::from_parts(Vec::new(), binding::default_options(descriptor), false)
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positionals.push(value.into());
        self
    }

    pub fn with_option(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.options.insert(name.to_string(), value.into());
        self
    }

    /// Explicit confirmation for permission-gated actions
    pub fn confirm(mut self) -> Self {
        self.confirmed = true;
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn positionals(&self) -> &[Value] {
        &self.positionals
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positionals.get(index)
    }

    pub fn str_arg(&self, index: usize) -> Result<&str> {
        self.positional(index)
            .and_then(Value::as_str)
            .ok_or_else(|| PlexusError::Usage(format!("Missing argument #{}", index + 1)))
    }

    /// Option value, `None` when absent or null
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name).filter(|v| !v.is_null())
    }

    pub fn str_option(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(Value::as_str)
    }

    pub fn int_option(&self, name: &str) -> Option<i64> {
        self.option(name).and_then(Value::as_i64)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.option(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub(crate) fn drop_options(&mut self) {
        self.options.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    /// Help text requested explicitly (exit 0)
    Help(String),
}

pub struct Dispatcher<'a> {
    registry: &'a CommandRegistry,
    groups: &'a [Box<dyn CommandGroup>],
    gate: &'a PermissionGate,
    presenter: &'a dyn Presenter,
    width: usize,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        registry: &'a CommandRegistry,
        groups: &'a [Box<dyn CommandGroup>],
        gate: &'a PermissionGate,
        presenter: &'a dyn Presenter,
    ) -> Self {
        Self {
            registry,
            groups,
            gate,
            presenter,
            width: help::terminal_width(),
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    fn group(&self, name: &str) -> Result<&'a dyn CommandGroup> {
        self.registry
            .group(name)
            .and_then(|_| self.groups.iter().find(|g| g.name() == name))
            .map(|g| g.as_ref())
            .ok_or_else(|| PlexusError::UnknownGroup(name.to_string()))
    }

    pub fn dispatch(&self, ctx: &mut ClientContext, tokens: &[String]) -> Result<DispatchOutcome> {
        let Some((group_name, rest)) = tokens.split_first() else {
            return Ok(DispatchOutcome::Help(help::render_overview(self.registry, self.width)));
        };
        let group = self.group(group_name)?;

        let Some((action_name, remaining)) = rest.split_first() else {
            return Err(PlexusError::MissingAction {
                group: group_name.clone(),
            });
        };
        if binding::is_help_flag(action_name) {
            return Ok(DispatchOutcome::Help(help::render_group(
                self.registry,
                group_name,
                self.width,
            )));
        }

        let descriptor = self
            .registry
            .find_action(group_name, action_name)
            .ok_or_else(|| PlexusError::UnknownAction {
                group: group_name.clone(),
                action: action_name.clone(),
            })?;

        let mut call = if remaining.is_empty() {
            if let Some(first) = descriptor.positionals.first() {
                return Err(PlexusError::Usage(format!(
                    "Missing required argument <{}>\nUsage: {}",
                    first.name,
                    descriptor.usage(group_name)
                )));
            }
            Call::defaults_for(descriptor)
        } else {
            match bind(descriptor, remaining)? {
                Binding::Help => {
                    return Ok(DispatchOutcome::Help(help::render_action(
                        group_name, descriptor, self.width,
                    )));
                }
                Binding::Call(call) => call,
            }
        };

        if !descriptor.accepts_options && !call.options().is_empty() {
            tracing::debug!(action = %descriptor.name, "action takes no options; dropping parsed options");
            call.drop_options();
        }

        let result = self.gate.guard(
            group_name,
            &descriptor.method,
            Some(descriptor),
            call.is_confirmed(),
            || group.invoke(ctx, &descriptor.method, &call),
        )?;

        self.route(group_name, descriptor, result)?;
        Ok(DispatchOutcome::Completed)
    }

    fn route(&self, group: &str, descriptor: &ActionDescriptor, result: Option<Value>) -> Result<()> {
        match result {
            Some(value) if has_content(&value) => self.presenter.present(&value),
            _ if descriptor.return_required => Err(PlexusError::MissingReturnValue {
                action: format!("{} {}", group, descriptor.name),
            }),
            _ => Ok(()),
        }
    }
}
