use crate::error::{PlexusError, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A named check applied to one field value.
///
/// `accepts` is the type predicate; `validate` is only consulted for values
/// that passed it.
pub trait Operator: Send + Sync {
    /// Type name reported in type-mismatch messages
    fn type_name(&self) -> &str;

    fn accepts(&self, value: &Value) -> bool;

    fn validate(&self, _value: &Value) -> bool {
        true
    }

    /// Message used when `validate` rejects a value
    fn describe(&self, field: &str) -> String;
}

/// Plain type check with an optional value rule, used for the built-ins.
pub struct TypeCheck {
    name: &'static str,
    accepts: fn(&Value) -> bool,
    rule: Option<(fn(&Value) -> bool, &'static str)>,
}

impl TypeCheck {
    pub const fn new(name: &'static str, accepts: fn(&Value) -> bool) -> Self {
        Self {
            name,
            accepts,
            rule: None,
        }
    }

    pub const fn with_rule(
        name: &'static str,
        accepts: fn(&Value) -> bool,
        rule: fn(&Value) -> bool,
        requirement: &'static str,
    ) -> Self {
        Self {
            name,
            accepts,
            rule: Some((rule, requirement)),
        }
    }
}

impl Operator for TypeCheck {
    fn type_name(&self) -> &str {
        self.name
    }

    fn accepts(&self, value: &Value) -> bool {
        (self.accepts)(value)
    }

    fn validate(&self, value: &Value) -> bool {
        self.rule.is_none_or(|(rule, _)| rule(value))
    }

    fn describe(&self, field: &str) -> String {
        match self.rule {
            Some((_, requirement)) => format!("'{}' must be {}", field, requirement),
            None => format!("'{}' must be of type {}", field, self.name),
        }
    }
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

fn is_non_negative(value: &Value) -> bool {
    value.is_u64() || value.as_i64().is_some_and(|n| n >= 0)
}

/// String that must contain a fixed substring
pub struct Contains {
    needle: String,
}

impl Contains {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl Operator for Contains {
    fn type_name(&self) -> &str {
        "String"
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn validate(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| s.contains(&self.needle))
    }

    fn describe(&self, field: &str) -> String {
        format!("'{}' must contain '{}'", field, self.needle)
    }
}

/// String holding a JSON document
pub struct JsonText;

impl Operator for JsonText {
    fn type_name(&self) -> &str {
        "String"
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn validate(&self, value: &Value) -> bool {
        value
            .as_str()
            .is_some_and(|s| serde_json::from_str::<Value>(s).is_ok())
    }

    fn describe(&self, field: &str) -> String {
        format!("'{}' must be a valid JSON string", field)
    }
}

/// String matching a regular expression
pub struct Matches {
    regex: Regex,
    hint: String,
}

impl Matches {
    pub fn new(pattern: &str, hint: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| PlexusError::Other(format!("Invalid pattern '{}': {}", pattern, e)))?;
        Ok(Self {
            regex,
            hint: hint.into(),
        })
    }
}

impl Operator for Matches {
    fn type_name(&self) -> &str {
        "String"
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn validate(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| self.regex.is_match(s))
    }

    fn describe(&self, field: &str) -> String {
        format!("'{}' must be {}", field, self.hint)
    }
}

/// String restricted to a fixed set of choices
pub struct OneOf {
    choices: Vec<String>,
}

impl OneOf {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

impl Operator for OneOf {
    fn type_name(&self) -> &str {
        "String"
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn validate(&self, value: &Value) -> bool {
        value
            .as_str()
            .is_some_and(|s| self.choices.iter().any(|c| c == s))
    }

    fn describe(&self, field: &str) -> String {
        format!("'{}' must be one of: {}", field, self.choices.join(", "))
    }
}

/// Named operators available to schema texts
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    operators: HashMap<String, Arc<dyn Operator>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ID`, `String`, `Int`, `Float`, `Boolean`, `JSON`, `IntGe0`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("ID", TypeCheck::new("ID", Value::is_string));
        registry.register("String", TypeCheck::new("String", Value::is_string));
        registry.register("Int", TypeCheck::new("Int", is_integer));
        registry.register("Float", TypeCheck::new("Float", Value::is_number));
        registry.register("Boolean", TypeCheck::new("Boolean", Value::is_boolean));
        registry.register("JSON", TypeCheck::new("JSON", Value::is_object));
        registry.register(
            "IntGe0",
            TypeCheck::with_rule("Int", is_integer, is_non_negative, "a non-negative integer"),
        );
        registry
    }

    /// Register (or replace) an operator under a schema type name
    pub fn register<O>(&mut self, name: impl Into<String>, operator: O)
    where
        O: Operator + 'static,
    {
        self.operators.insert(name.into(), Arc::new(operator));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Operator>> {
        self.operators.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }
}
