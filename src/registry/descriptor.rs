use crate::error::{PlexusError, Result};
use crate::utils::paths;
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Scalar type of a positional argument or valued option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Float,
    Bool,
    Json,
}

impl ValueType {
    pub fn parse(&self, raw: &str) -> std::result::Result<Value, String> {
        match self {
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Int => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| format!("expected an integer, got '{}'", raw)),
            ValueType::Float => raw
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| format!("expected a number, got '{}'", raw)),
            ValueType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "no" | "0" | "off" => Ok(Value::Bool(false)),
                _ => Err(format!("expected true or false, got '{}'", raw)),
            },
            ValueType::Json => {
                serde_json::from_str(raw).map_err(|e| format!("invalid JSON '{}': {}", raw, e))
            }
        }
    }

    pub fn metavar(&self) -> &'static str {
        match self {
            ValueType::String => "TEXT",
            ValueType::Int => "INT",
            ValueType::Float => "NUMBER",
            ValueType::Bool => "BOOL",
            ValueType::Json => "JSON",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metavar())
    }
}

/// How an optional argument is introduced on the command line and turned
/// into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `--flag`, true when present
    Toggle,
    /// `--flag VALUE` / `--flag=VALUE`
    Scalar(ValueType),
    /// `--flag PATH`, normalized to an absolute path
    FilePath,
}

impl FlagKind {
    pub fn takes_value(&self) -> bool {
        !matches!(self, FlagKind::Toggle)
    }

    /// Value bound when the flag is absent
    pub fn default_value(&self) -> Value {
        match self {
            FlagKind::Toggle => Value::Bool(false),
            _ => Value::Null,
        }
    }

    pub fn metavar(&self) -> Option<&'static str> {
        match self {
            FlagKind::Toggle => None,
            FlagKind::Scalar(ty) => Some(ty.metavar()),
            FlagKind::FilePath => Some("PATH"),
        }
    }

    pub fn bind(&self, flag: &str, raw: Option<&str>) -> Result<Value> {
        match (self, raw) {
            (FlagKind::Toggle, None) => Ok(Value::Bool(true)),
            (FlagKind::Toggle, Some(_)) => Err(PlexusError::Usage(format!(
                "{} does not take a value",
                flag
            ))),
            (_, None) => Err(PlexusError::Usage(format!("{} requires a value", flag))),
            (FlagKind::Scalar(ty), Some(raw)) => ty
                .parse(raw)
                .map_err(|e| PlexusError::Usage(format!("{}: {}", flag, e))),
            (FlagKind::FilePath, Some(raw)) => {
                let path = paths::normalize(Path::new(raw))?;
                Ok(Value::String(path.to_string_lossy().into_owned()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: String,
    pub ty: ValueType,
    pub help: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: String,
    pub kind: FlagKind,
    pub help: String,
}

impl OptionSpec {
    pub fn flag(&self) -> String {
        format!("--{}", self.name)
    }
}

/// Name of the confirmation toggle added to permission-gated actions
pub const CONFIRM_OPTION: &str = "yes";

/// Declared shape of one CLI action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDescriptor {
    /// CLI-facing verb
    pub name: String,
    pub description: String,
    /// Method the owning command group dispatches on
    pub method: String,
    pub positionals: Vec<ArgSpec>,
    pub optionals: Vec<OptionSpec>,
    pub return_required: bool,
    pub requires_permission: bool,
    /// Whether the method takes the keyword options at all
    pub accepts_options: bool,
}

impl ActionDescriptor {
    pub fn builder(name: impl Into<String>, method: impl Into<String>) -> ActionBuilder {
        ActionBuilder {
            descriptor: ActionDescriptor {
                name: name.into(),
                description: String::new(),
                method: method.into(),
                positionals: Vec::new(),
                optionals: Vec::new(),
                return_required: false,
                requires_permission: false,
                accepts_options: true,
            },
        }
    }

    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.optionals.iter().find(|o| o.name == name)
    }

    pub fn usage(&self, group: &str) -> String {
        let mut usage = format!("{} {} {}", crate::project_identity::BINARY_NAME, group, self.name);
        for arg in &self.positionals {
            usage.push_str(&format!(" <{}>", arg.name));
        }
        for option in &self.optionals {
            match option.kind.metavar() {
                Some(metavar) => usage.push_str(&format!(" [{} {}]", option.flag(), metavar)),
                None => usage.push_str(&format!(" [{}]", option.flag())),
            }
        }
        usage
    }
}

pub struct ActionBuilder {
    descriptor: ActionDescriptor,
}

impl ActionBuilder {
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = description.into();
        self
    }

    /// Required positional, consumed in declaration order
    pub fn arg(mut self, name: impl Into<String>, ty: ValueType, help: impl Into<String>) -> Self {
        self.descriptor.positionals.push(ArgSpec {
            name: name.into(),
            ty,
            help: help.into(),
        });
        self
    }

    pub fn option(mut self, name: impl Into<String>, kind: FlagKind, help: impl Into<String>) -> Self {
        let name = name.into();
        self.descriptor.optionals.retain(|o| o.name != name);
        self.descriptor.optionals.push(OptionSpec {
            name,
            kind,
            help: help.into(),
        });
        self
    }

    pub fn toggle(self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.option(name, FlagKind::Toggle, help)
    }

    pub fn file(self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.option(name, FlagKind::FilePath, help)
    }

    /// An empty result from this action is an error
    pub fn returns(mut self) -> Self {
        self.descriptor.return_required = true;
        self
    }

    /// Gate the action behind `--yes`
    pub fn requires_permission(mut self) -> Self {
        self.descriptor.requires_permission = true;
        self.toggle(CONFIRM_OPTION, "Confirm this operation")
    }

    /// The bound method takes no keyword options; parsed options are dropped
    pub fn positional_only(mut self) -> Self {
        self.descriptor.accepts_options = false;
        self
    }

    pub fn build(self) -> ActionDescriptor {
        self.descriptor
    }
}
