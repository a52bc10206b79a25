//! Confirmation gate for destructive actions
//!
//! The set of gated actions is captured from the registry at bootstrap, so
//! it is known without invoking anything (help output annotates it). At call
//! time a gated action without `--yes` is refused before its body runs, but
//! only when enforcement is switched on (CLI mode). In library use the gate
//! is inert and only logs.

use crate::error::{PlexusError, Result};
use crate::registry::{ActionDescriptor, CommandRegistry, qualified_name};
use crate::ui as output;
use std::collections::BTreeSet;

/// Called when a gated action is invoked without confirmation
pub trait RefusalHandler {
    fn refuse(&self, action: &str);
}

/// Library mode: refusal is only traced
pub struct SilentRefusal;

impl RefusalHandler for SilentRefusal {
    fn refuse(&self, action: &str) {
        tracing::debug!(action, "refused unconfirmed action");
    }
}

/// CLI mode: tell the user why nothing happened
pub struct CliRefusal;

impl RefusalHandler for CliRefusal {
    fn refuse(&self, action: &str) {
        output::warning(&format!(
            "Refusing to run '{}' without explicit confirmation.",
            action
        ));
    }
}

pub struct PermissionGate {
    gated: BTreeSet<String>,
    enforce: bool,
    handler: Box<dyn RefusalHandler>,
}

impl PermissionGate {
    /// Inert gate over the given qualified `group.method` names
    pub fn new(gated: BTreeSet<String>) -> Self {
        Self {
            gated,
            enforce: false,
            handler: Box::new(SilentRefusal),
        }
    }

    pub fn from_registry(registry: &CommandRegistry) -> Self {
        Self::new(registry.gated_actions())
    }

    /// Switch enforcement on with the given refusal handler
    pub fn enforcing(mut self, handler: impl RefusalHandler + 'static) -> Self {
        self.enforce = true;
        self.handler = Box::new(handler);
        self
    }

    pub fn is_enforcing(&self) -> bool {
        self.enforce
    }

    pub fn is_gated(&self, group: &str, method: &str) -> bool {
        self.gated.contains(&qualified_name(group, method))
    }

    /// Run `f` unless the action is gated, unconfirmed and enforcement is on.
    pub fn guard<T, F>(
        &self,
        group: &str,
        method: &str,
        descriptor: Option<&ActionDescriptor>,
        confirmed: bool,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if confirmed || !self.is_gated(group, method) {
            return f();
        }

        // Unknown descriptors are reported by their raw method name.
        let action = descriptor
            .map(|d| format!("{} {}", group, d.name))
            .unwrap_or_else(|| method.to_string());

        if !self.enforce {
            tracing::debug!(%action, "confirmation missing; gate not enforced");
            return f();
        }

        self.handler.refuse(&action);
        Err(PlexusError::PermissionRefused { action })
    }
}
