//! API client context
//!
//! Commands talk to the platform through the `Transport` trait. The HTTP
//! implementation lives in `http`; tests substitute a scripted fake.

pub mod errors;
pub mod http;
pub mod pagination;
pub mod polling;

#[cfg(test)]
pub(crate) mod fake;

pub use errors::{GraphqlError, translate_not_found};
pub use http::{HttpTransport, parse_endpoint};
pub use pagination::Paginated;
pub use polling::{POLL_INTERVAL, wait_for};

use crate::config::{ConfigStore, GroupRecord, GroupResolver};
use crate::error::{PlexusError, Result};
use serde_json::{Value, json};
use std::path::Path;

/// Caller-supplied translation of GraphQL errors; `None` falls back to the
/// default classification.
pub type ErrorHandler<'a> = &'a dyn Fn(&GraphqlError) -> Option<PlexusError>;

/// Streamed log lines
pub type LogLines = Box<dyn Iterator<Item = Result<String>>>;

/// Network collaborator contract
pub trait Transport {
    /// Run a GraphQL document and return its `data` member.
    fn request(&self, query: &str, variables: Value, on_error: Option<ErrorHandler<'_>>) -> Result<Value>;

    fn request_logs(&self, endpoint: &str, follow: bool, tail: Option<u64>) -> Result<LogLines>;

    /// Download `endpoint` into `dest`, creating parent directories.
    fn request_file(&self, endpoint: &str, dest: &Path) -> Result<()>;
}

const GROUP_BY_NAME: &str = r#"
query GroupByName($name: String!) {
  group(name: $name) {
    id
    name
    displayName
  }
}
"#;

/// Resolves group names through the API
pub struct GroupLookup<'a>(pub &'a dyn Transport);

impl GroupResolver for GroupLookup<'_> {
    fn resolve_group(&self, name: &str) -> Result<GroupRecord> {
        let data = self.0.request(GROUP_BY_NAME, json!({ "name": name }), None)?;
        match data.get("group") {
            Some(group) if !group.is_null() => Ok(serde_json::from_value(group.clone())?),
            _ => Err(PlexusError::not_found("Group", name, "name")),
        }
    }
}

/// Shared state handed to every command group invocation
pub struct ClientContext {
    pub config: ConfigStore,
    transport: Box<dyn Transport>,
}

impl ClientContext {
    pub fn new(config: ConfigStore, transport: Box<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn request(&self, query: &str, variables: Value) -> Result<Value> {
        self.transport.request(query, variables, None)
    }

    /// Active group with its id, resolving a bare name through the API.
    pub fn active_group(&mut self) -> Result<GroupRecord> {
        let lookup = GroupLookup(self.transport.as_ref());
        self.config.resolve_current_group(&lookup)
    }

    /// Pull-based iterator over a paginated connection
    pub fn paginate<'a>(&'a self, query: &'a str, connection: &'a str, variables: Value) -> Paginated<'a> {
        Paginated::new(self.transport.as_ref(), query, connection, variables)
    }
}
