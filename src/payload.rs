//! Payload loading for mutation-style actions
//!
//! Piped stdin wins over `--file`; with neither the payload is `{}`.

use crate::error::{PlexusError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

pub fn load_payload(file: Option<&Path>) -> Result<Value> {
    let piped = !atty::is(atty::Stream::Stdin);
    let stdin = if piped { Some(io::stdin().lock()) } else { None };
    load_payload_from(stdin, file)
}

/// `stdin` is `Some` only when input is piped. Whitespace-only input is
/// treated as absent so a closed stdin does not shadow `--file`.
pub fn load_payload_from<R: Read>(stdin: Option<R>, file: Option<&Path>) -> Result<Value> {
    if let Some(mut reader) = stdin {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        if !content.trim().is_empty() {
            tracing::debug!("payload read from stdin");
            return parse(&content, "stdin");
        }
    }

    if let Some(path) = file {
        let content = fs::read_to_string(path).map_err(|e| PlexusError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        return parse(&content, &path.display().to_string());
    }

    Ok(Value::Object(Map::new()))
}

fn parse(content: &str, source: &str) -> Result<Value> {
    serde_json::from_str(content)
        .map_err(|e| PlexusError::validation(format!("Payload from {} is not valid JSON: {}", source, e)))
}
