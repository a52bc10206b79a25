//! Scripted transport for unit tests

use super::{ErrorHandler, LogLines, Transport};
use crate::error::{PlexusError, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: String,
    pub variables: Value,
}

type Handler = Box<dyn Fn(&str, &Value) -> Result<Value>>;

pub struct FakeTransport {
    handler: Handler,
    calls: Rc<RefCell<Vec<RecordedCall>>>,
    downloads: Rc<RefCell<Vec<(String, PathBuf)>>>,
    log_lines: Vec<String>,
}

impl FakeTransport {
    /// `handler` receives the operation name and variables of each request
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value> + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Rc::new(RefCell::new(Vec::new())),
            downloads: Rc::new(RefCell::new(Vec::new())),
            log_lines: Vec::new(),
        }
    }

    pub fn with_logs(mut self, lines: &[&str]) -> Self {
        self.log_lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Rc<RefCell<Vec<RecordedCall>>> {
        self.calls.clone()
    }

    pub fn downloads(&self) -> Rc<RefCell<Vec<(String, PathBuf)>>> {
        self.downloads.clone()
    }
}

/// `query ListJobs(...)` -> `ListJobs`
pub fn operation_name(query: &str) -> String {
    query
        .split_whitespace()
        .skip_while(|word| *word != "query" && *word != "mutation")
        .nth(1)
        .map(|word| word.split(['(', '{']).next().unwrap_or(word).to_string())
        .unwrap_or_default()
}

impl Transport for FakeTransport {
    fn request(&self, query: &str, variables: Value, _on_error: Option<ErrorHandler<'_>>) -> Result<Value> {
        let operation = operation_name(query);
        self.calls.borrow_mut().push(RecordedCall {
            operation: operation.clone(),
            variables: variables.clone(),
        });
        (self.handler)(&operation, &variables)
    }

    fn request_logs(&self, _endpoint: &str, _follow: bool, tail: Option<u64>) -> Result<LogLines> {
        let skip = tail
            .map(|t| self.log_lines.len().saturating_sub(t as usize))
            .unwrap_or(0);
        let lines: Vec<Result<String>> = self.log_lines.iter().skip(skip).cloned().map(Ok).collect();
        Ok(Box::new(lines.into_iter()))
    }

    fn request_file(&self, endpoint: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PlexusError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(dest, endpoint.as_bytes())?;
        self.downloads
            .borrow_mut()
            .push((endpoint.to_string(), dest.to_path_buf()));
        Ok(())
    }
}

#[test]
fn operation_names_are_extracted() {
    assert_eq!(operation_name("query ListJobs($first: Int) { x }"), "ListJobs");
    assert_eq!(operation_name("\nmutation DeleteJob{ x }"), "DeleteJob");
    assert_eq!(operation_name("{ anonymous }"), "");
}
