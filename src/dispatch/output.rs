//! Result routing to the display collaborator

use crate::error::Result;
use serde_json::Value;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly tree view
    #[default]
    Tree,
    Json,
}

pub trait Presenter {
    fn present(&self, value: &Value) -> Result<()>;
}

/// Prints results on stdout in the selected mode
pub struct StdoutPresenter {
    mode: OutputMode,
}

impl StdoutPresenter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl Presenter for StdoutPresenter {
    fn present(&self, value: &Value) -> Result<()> {
        let rendered = render(value, self.mode)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", rendered.trim_end())?;
        Ok(())
    }
}

pub fn render(value: &Value, mode: OutputMode) -> Result<String> {
    match (mode, value) {
        (OutputMode::Json, _) => Ok(serde_json::to_string_pretty(value)?),
        (OutputMode::Tree, Value::String(s)) => Ok(s.clone()),
        (OutputMode::Tree, _) => Ok(serde_yml::to_string(value)?),
    }
}

/// Falsy results (null, false, empty string/array/object) are not shown.
pub fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values_have_no_content() {
        for value in [json!(null), json!(false), json!(""), json!([]), json!({})] {
            assert!(!has_content(&value), "{}", value);
        }
        for value in [json!(0), json!(true), json!("x"), json!([0]), json!({ "a": null })] {
            assert!(has_content(&value), "{}", value);
        }
    }

    #[test]
    fn json_mode_pretty_prints() {
        let rendered = render(&json!({ "name": "job" }), OutputMode::Json).unwrap();
        assert_eq!(rendered, "{\n  \"name\": \"job\"\n}");
    }

    #[test]
    fn tree_mode_renders_nested_keys() {
        let rendered = render(
            &json!({ "job": { "name": "train", "status": "running" } }),
            OutputMode::Tree,
        )
        .unwrap();
        assert!(rendered.contains("job:"));
        assert!(rendered.contains("  name: train"));
    }

    #[test]
    fn tree_mode_prints_strings_raw() {
        assert_eq!(render(&json!("done"), OutputMode::Tree).unwrap(), "done");
    }
}
