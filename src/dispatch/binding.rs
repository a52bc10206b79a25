//! Token binding against an action's declared shape

use super::Call;
use crate::error::{PlexusError, Result};
use crate::registry::{ActionDescriptor, CONFIRM_OPTION};
use serde_json::{Map, Value};

#[derive(Debug, PartialEq)]
pub enum Binding {
    Call(Call),
    Help,
}

pub fn is_help_flag(token: &str) -> bool {
    token == "-h" || token == "--help"
}

/// Options at their absent values (`false` for toggles, `null` otherwise)
pub fn default_options(descriptor: &ActionDescriptor) -> Map<String, Value> {
    descriptor
        .optionals
        .iter()
        .map(|o| (o.name.clone(), o.kind.default_value()))
        .collect()
}

/// Bind raw tokens: positionals in declaration order (all required),
/// options by flag in any order. `--` ends option parsing.
pub fn bind(descriptor: &ActionDescriptor, tokens: &[String]) -> Result<Binding> {
    let mut positionals = Vec::with_capacity(descriptor.positionals.len());
    let mut options = default_options(descriptor);
    let mut options_done = false;
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        if !options_done {
            if token == "--" {
                options_done = true;
                continue;
            }
            if is_help_flag(token) {
                return Ok(Binding::Help);
            }
            if let Some(flag) = token.strip_prefix("--") {
                let (name, inline) = match flag.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (flag, None),
                };
                let spec = descriptor.option(name).ok_or_else(|| {
                    PlexusError::Usage(format!(
                        "Unknown option '--{}' for '{}'",
                        name, descriptor.name
                    ))
                })?;
                let raw = match inline {
                    Some(value) => Some(value),
                    // A following flag is never taken as the value; use
                    // `--flag=--value` for values that start with dashes.
                    None if spec.kind.takes_value() => match iter.next() {
                        Some(next) if !next.starts_with("--") => Some(next.clone()),
                        _ => {
                            return Err(PlexusError::Usage(format!(
                                "{} requires a value",
                                spec.flag()
                            )));
                        }
                    },
                    None => None,
                };
                let value = spec.kind.bind(&spec.flag(), raw.as_deref())?;
                options.insert(spec.name.clone(), value);
                continue;
            }
        }

        let spec = descriptor.positionals.get(positionals.len()).ok_or_else(|| {
            PlexusError::Usage(format!(
                "Unexpected argument '{}' for '{}'",
                token, descriptor.name
            ))
        })?;
        let value = spec
            .ty
            .parse(token)
            .map_err(|e| PlexusError::Usage(format!("<{}>: {}", spec.name, e)))?;
        positionals.push(value);
    }

    if let Some(missing) = descriptor.positionals.get(positionals.len()) {
        return Err(PlexusError::Usage(format!(
            "Missing required argument <{}> for '{}'",
            missing.name, descriptor.name
        )));
    }

    let confirmed = options
        .get(CONFIRM_OPTION)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(Binding::Call(Call::from_parts(positionals, options, confirmed)))
}
