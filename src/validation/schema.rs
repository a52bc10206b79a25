use super::operators::{Operator, OperatorRegistry};
use crate::error::{PlexusError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

static INPUT_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^input\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{$").expect("valid input header regex")
});

static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*:\s*([A-Za-z_][A-Za-z0-9_]*)\s*(!)?$")
        .expect("valid field regex")
});

/// Operators declared for one field, in source order
#[derive(Clone)]
pub struct FieldRules {
    pub name: String,
    pub required: bool,
    operators: Vec<Arc<dyn Operator>>,
}

impl FieldRules {
    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }
}

#[derive(Clone, Default)]
pub struct ValidationSpec {
    name: Option<String>,
    fields: Vec<FieldRules>,
    example: Option<Value>,
}

impl ValidationSpec {
    /// Parse a schema text such as:
    ///
    /// ```text
    /// input CreateJobInput {
    ///   name: String!
    ///   gpuCount: IntGe0
    /// }
    /// ```
    ///
    /// The `input` wrapper is optional. Repeating a field adds operators.
    pub fn parse(text: &str, registry: &OperatorRegistry) -> Result<Self> {
        let mut spec = Self::default();
        let mut open_block = false;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            let line = line.trim_end_matches(',').trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = INPUT_OPEN.captures(line) {
                if open_block {
                    return Err(schema_error(line_no, "nested input blocks are not supported"));
                }
                spec.name = Some(caps[1].to_string());
                open_block = true;
                continue;
            }

            if line == "}" {
                if !open_block {
                    return Err(schema_error(line_no, "unexpected '}'"));
                }
                open_block = false;
                continue;
            }

            let caps = FIELD_LINE.captures(line).ok_or_else(|| {
                schema_error(line_no, &format!("expected 'field: Type' but found '{}'", line))
            })?;
            let field = &caps[1];
            let type_name = &caps[2];
            let required = caps.get(3).is_some();

            let operator = registry
                .get(type_name)
                .ok_or_else(|| schema_error(line_no, &format!("unknown type '{}'", type_name)))?;

            spec.push_operator(field, required, operator);
        }

        if open_block {
            return Err(schema_error(
                text.lines().count(),
                "unterminated input block",
            ));
        }

        Ok(spec)
    }

    fn push_operator(&mut self, field: &str, required: bool, operator: Arc<dyn Operator>) {
        match self.fields.iter_mut().find(|f| f.name == field) {
            Some(existing) => {
                existing.required |= required;
                existing.operators.push(operator);
            }
            None => self.fields.push(FieldRules {
                name: field.to_string(),
                required,
                operators: vec![operator],
            }),
        }
    }

    /// Attach an example payload shown with every failure message
    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[FieldRules] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a payload, reporting only the first violation.
    pub fn validate(&self, payload: &Value) -> Result<()> {
        let object = payload
            .as_object()
            .ok_or_else(|| self.failure(format!("payload must be a JSON object (got {})", kind_of(payload))))?;

        for field in &self.fields {
            let value = match object.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(self.failure(format!("'{}' is required", field.name)));
                    }
                    continue;
                }
                Some(value) => value,
            };

            for operator in &field.operators {
                if !operator.accepts(value) {
                    return Err(self.failure(format!(
                        "'{}' must be of type {} (got {})",
                        field.name,
                        operator.type_name(),
                        kind_of(value)
                    )));
                }
                if !operator.validate(value) {
                    return Err(self.failure(operator.describe(&field.name)));
                }
            }
        }

        Ok(())
    }

    fn failure(&self, message: String) -> PlexusError {
        let message = match &self.example {
            Some(example) => {
                let pretty = serde_json::to_string_pretty(example).unwrap_or_default();
                format!("{}\n\nExample payload:\n{}", message, pretty)
            }
            None => message,
        };
        PlexusError::Validation { message }
    }
}

fn schema_error(line: usize, message: &str) -> PlexusError {
    PlexusError::InvalidSchema {
        line,
        message: message.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
