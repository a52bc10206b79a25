//! `config` command group
//!
//! Shows and changes the client configuration. In CLI mode the setters are
//! re-registered with variants that also write the config file.

use crate::client::{ClientContext, parse_endpoint};
use crate::config::ConfigKey;
use crate::dispatch::{Call, CommandGroup, unknown_method};
use crate::error::Result;
use crate::project_identity;
use crate::registry::{ActionDescriptor, ActionSet, ValueType};
use crate::ui as output;
use serde_json::{Value, json};

pub struct ConfigCommands {
    persist: bool,
}

impl ConfigCommands {
    pub fn new(persist: bool) -> Self {
        Self { persist }
    }
}

const SETTERS: [(&str, ConfigKey, &str, &str); 3] = [
    ("set-endpoint", ConfigKey::Endpoint, "url", "Set the API endpoint"),
    ("set-token", ConfigKey::ApiToken, "token", "Set the API token"),
    ("set-group", ConfigKey::Group, "name", "Set the active group"),
];

fn setter_method(key: ConfigKey, persist: bool) -> String {
    let base = match key {
        ConfigKey::Endpoint => "set_endpoint",
        ConfigKey::ApiToken => "set_token",
        ConfigKey::Group => "set_group",
    };
    if persist {
        format!("{}_and_save", base)
    } else {
        base.to_string()
    }
}

fn setter_for(method: &str) -> Option<(ConfigKey, bool)> {
    let persist = method.ends_with("_and_save");
    let key = match method.trim_end_matches("_and_save") {
        "set_endpoint" => ConfigKey::Endpoint,
        "set_token" => ConfigKey::ApiToken,
        "set_group" => ConfigKey::Group,
        _ => return None,
    };
    Some((key, persist))
}

fn setter(name: &str, key: ConfigKey, arg: &str, about: &str, persist: bool) -> ActionDescriptor {
    let about = if persist {
        format!("{} and save it to the config file", about)
    } else {
        about.to_string()
    };
    ActionDescriptor::builder(name, setter_method(key, persist))
        .about(about)
        .arg(arg, ValueType::String, format!("New {}", key))
        .build()
}

/// `abcd1234efgh` -> `abcd********`
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    let hidden = token.chars().count().saturating_sub(4);
    if hidden == 0 {
        return "*".repeat(token.chars().count());
    }
    format!("{}{}", visible, "*".repeat(hidden))
}

impl CommandGroup for ConfigCommands {
    fn name(&self) -> &'static str {
        "config"
    }

    fn about(&self) -> &'static str {
        "Show and change client configuration"
    }

    fn declare(&self, actions: &mut ActionSet<'_>) {
        actions.add(
            ActionDescriptor::builder("show", "show")
                .about("Show the resolved configuration")
                .returns()
                .build(),
        );
        for (name, key, arg, about) in SETTERS {
            actions.add(setter(name, key, arg, about, false));
        }
        actions.add(
            ActionDescriptor::builder("save", "save")
                .about("Write the resolved configuration to disk")
                .file("path", "Write to this file instead of the active config file")
                .build(),
        );

        if self.persist {
            // Same verbs, persisting variants.
            for (name, key, arg, about) in SETTERS {
                actions.add(setter(name, key, arg, about, true));
            }
        }
    }

    fn invoke(&self, ctx: &mut ClientContext, method: &str, call: &Call) -> Result<Option<Value>> {
        match method {
            "show" => Ok(Some(show(ctx))),
            "save" => {
                match call.str_option("path") {
                    Some(path) => ctx.config.save_to(std::path::Path::new(path))?,
                    None => ctx.config.save()?,
                }
                output::success("Configuration saved");
                Ok(None)
            }
            _ => match setter_for(method) {
                Some((key, persist)) => set(ctx, key, call.str_arg(0)?, persist),
                None => Err(unknown_method(self.name(), method)),
            },
        }
    }
}

fn show(ctx: &ClientContext) -> Value {
    let config = &ctx.config;
    json!({
        "path": config.path().display().to_string(),
        "endpoint": config.endpoint().unwrap_or(project_identity::DEFAULT_ENDPOINT),
        "api-token": config.api_token().map(mask_token),
        "group": config.current_group(),
    })
}

fn set(ctx: &mut ClientContext, key: ConfigKey, value: &str, persist: bool) -> Result<Option<Value>> {
    if key == ConfigKey::Endpoint {
        parse_endpoint(value)?;
    }
    ctx.config.set(key, value);

    let mut result = None;
    if key == ConfigKey::Group {
        match ctx.active_group() {
            Ok(group) => result = Some(serde_json::to_value(group)?),
            Err(e) => output::warning(&format!(
                "Group '{}' could not be resolved ({}); it stays inactive until it is.",
                value, e
            )),
        }
    }

    if persist {
        ctx.config.save()?;
        output::success(&format!("{} saved to {}", key, ctx.config.path().display()));
    } else {
        output::success(&format!("{} updated", key));
    }
    Ok(result)
}
