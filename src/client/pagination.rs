use super::Transport;
use crate::error::{PlexusError, Result};
use serde_json::{Value, json};
use std::collections::VecDeque;

pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Lazily walks a `{ edges { cursor node } }` connection.
///
/// A page is only requested once the previous one has been consumed. An
/// empty edge list ends the iteration; so does the first error, which is
/// yielded once.
pub struct Paginated<'a> {
    transport: &'a dyn Transport,
    query: &'a str,
    connection: &'a str,
    variables: Value,
    page_size: u64,
    after: Option<String>,
    buffer: VecDeque<Value>,
    done: bool,
}

impl<'a> Paginated<'a> {
    /// `connection` is the dotted path of the connection inside `data`
    /// (e.g. `jobs` or `group.datasets`).
    pub fn new(transport: &'a dyn Transport, query: &'a str, connection: &'a str, variables: Value) -> Self {
        Self {
            transport,
            query,
            connection,
            variables,
            page_size: DEFAULT_PAGE_SIZE,
            after: None,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    pub fn page_size(mut self, size: u64) -> Self {
        self.page_size = size.max(1);
        self
    }

    fn fetch_page(&mut self) -> Result<()> {
        let mut variables = match self.variables.clone() {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(PlexusError::Other(format!(
                    "pagination variables must be an object, got {}",
                    other
                )));
            }
        };
        variables.insert("first".to_string(), json!(self.page_size));
        variables.insert("after".to_string(), json!(self.after));

        let data = self
            .transport
            .request(self.query, Value::Object(variables), None)?;

        let connection = self
            .connection
            .split('.')
            .try_fold(&data, |node, key| node.get(key))
            .ok_or_else(|| {
                PlexusError::Graphql(format!("response has no '{}' connection", self.connection))
            })?;
        let edges = connection
            .get("edges")
            .and_then(Value::as_array)
            .ok_or_else(|| PlexusError::Graphql(format!("'{}' has no edge list", self.connection)))?;

        if edges.is_empty() {
            self.done = true;
            return Ok(());
        }

        let last_cursor = edges
            .last()
            .and_then(|edge| edge.get("cursor"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if last_cursor.is_none() {
            // Without a cursor the next request would repeat this page.
            tracing::debug!(connection = self.connection, "edge without cursor; stopping");
            self.done = true;
        }
        self.after = last_cursor;

        self.buffer.extend(
            edges
                .iter()
                .map(|edge| edge.get("node").cloned().unwrap_or(Value::Null)),
        );
        Ok(())
    }
}

impl Iterator for Paginated<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests;
