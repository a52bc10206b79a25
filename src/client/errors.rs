use super::ErrorHandler;
use crate::error::PlexusError;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

/// `<Kind> not found (<key_type>: <key>)`, as reported by the API
static NOT_FOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<kind>[A-Za-z][A-Za-z ]*?) not found \((?P<key_type>[A-Za-z_]+): (?P<key>[^)]+)\)$")
        .expect("valid not-found regex")
});

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<Value>>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }
}

pub fn translate_not_found(message: &str) -> Option<PlexusError> {
    let caps = NOT_FOUND.captures(message.trim())?;
    Some(PlexusError::not_found(
        &caps["kind"],
        &caps["key"],
        &caps["key_type"],
    ))
}

/// Turn the error list of a GraphQL response into one crate error.
///
/// The caller's handler gets the first say; recognised not-found messages
/// become `ResourceNotFound`; anything else is reported verbatim.
pub fn classify(errors: &[GraphqlError], on_error: Option<ErrorHandler<'_>>) -> PlexusError {
    let Some(first) = errors.first() else {
        return PlexusError::Graphql("empty error list".to_string());
    };

    if let Some(handler) = on_error
        && let Some(err) = errors.iter().find_map(handler)
    {
        return err;
    }

    translate_not_found(&first.message)
        .unwrap_or_else(|| PlexusError::Graphql(first.message.clone()))
}
