use super::errors::{GraphqlError, classify};
use super::{ErrorHandler, LogLines, Transport};
use crate::config::ConfigStore;
use crate::error::{PlexusError, Result};
use crate::project_identity;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

/// Parse an API endpoint, rejecting anything that is not an absolute URL.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| PlexusError::Usage(format!("Invalid API endpoint '{}': {}", raw, e)))
}

/// Blocking HTTP transport with bearer-token auth.
///
/// The endpoint is only parsed when a request is made, so a bad stored
/// endpoint does not block commands that never reach the network.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(endpoint: &str, token: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(project_identity::USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }

    /// Build from the resolved config snapshot, falling back to the
    /// public endpoint.
    pub fn from_config(config: &ConfigStore) -> Result<Self> {
        let endpoint = config
            .endpoint()
            .unwrap_or(project_identity::DEFAULT_ENDPOINT);
        Self::new(endpoint, config.api_token())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Relative endpoints (`/jobs/12/logs`) resolve against the API host.
    fn url_for(&self, endpoint: &str) -> Result<Url> {
        parse_endpoint(&self.endpoint)?
            .join(endpoint)
            .map_err(|e| PlexusError::Usage(format!("Invalid endpoint '{}': {}", endpoint, e)))
    }
}

impl Transport for HttpTransport {
    fn request(&self, query: &str, variables: Value, on_error: Option<ErrorHandler<'_>>) -> Result<Value> {
        tracing::debug!(endpoint = %self.endpoint, "graphql request");

        let url = parse_endpoint(&self.endpoint)?;
        let response = self
            .authorized(self.client.post(url))
            .json(&json!({ "query": query, "variables": variables }))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        let parsed: GraphqlResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(PlexusError::Transport(format!("HTTP {}", status)));
            }
            Err(e) => {
                return Err(PlexusError::Transport(format!("Malformed response: {}", e)));
            }
        };

        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            return Err(classify(&errors, on_error));
        }
        if !status.is_success() {
            return Err(PlexusError::Transport(format!("HTTP {}", status)));
        }

        Ok(parsed.data.unwrap_or(Value::Null))
    }

    fn request_logs(&self, endpoint: &str, follow: bool, tail: Option<u64>) -> Result<LogLines> {
        let mut url = self.url_for(endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("follow", if follow { "true" } else { "false" });
            if let Some(tail) = tail {
                pairs.append_pair("tail", &tail.to_string());
            }
        }

        let response = self.authorized(self.client.get(url)).send()?;
        if !response.status().is_success() {
            return Err(PlexusError::Transport(format!(
                "Log stream failed: HTTP {}",
                response.status()
            )));
        }

        let lines = BufReader::new(response)
            .lines()
            .map(|line| line.map_err(PlexusError::from));
        Ok(Box::new(lines))
    }

    fn request_file(&self, endpoint: &str, dest: &Path) -> Result<()> {
        let url = self.url_for(endpoint)?;
        let mut response = self.authorized(self.client.get(url)).send()?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(PlexusError::not_found("File", endpoint, "path")),
            status => return Err(PlexusError::Transport(format!("Download failed: HTTP {}", status))),
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| PlexusError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(dest).map_err(|e| PlexusError::IoError {
            path: dest.to_path_buf(),
            source: e,
        })?;
        response.copy_to(&mut file)?;
        Ok(())
    }
}
