//! `jobs` command group
//!
//! Jobs live inside the active group, so every action here resolves the
//! group id before talking to the API.

use crate::client::{ClientContext, GraphqlError, POLL_INTERVAL, wait_for};
use crate::dispatch::{Call, CommandGroup, unknown_method};
use crate::error::{PlexusError, Result};
use crate::payload;
use crate::registry::{ActionDescriptor, ActionSet, FlagKind, ValueType};
use crate::ui as output;
use crate::utils::paths;
use crate::validation::{Matches, OneOf, OperatorRegistry, ValidationSpec};
use serde_json::{Value, json};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const LIST_JOBS: &str = r#"
query ListJobs($groupId: ID!, $status: String, $first: Int, $after: String) {
  jobs(groupId: $groupId, status: $status, first: $first, after: $after) {
    edges {
      cursor
      node { name status image createdAt }
    }
  }
}
"#;

const GET_JOB: &str = r#"
query GetJob($groupId: ID!, $name: String!) {
  job(groupId: $groupId, name: $name) {
    name
    status
    image
    command
    gpuCount
    priority
    createdAt
    finishedAt
  }
}
"#;

const CREATE_JOB: &str = r#"
mutation CreateJob($groupId: ID!, $input: CreateJobInput!) {
  createJob(groupId: $groupId, input: $input) {
    name
    status
  }
}
"#;

const DELETE_JOB: &str = r#"
mutation DeleteJob($groupId: ID!, $name: String!) {
  deleteJob(groupId: $groupId, name: $name) {
    name
  }
}
"#;

const CREATE_JOB_SCHEMA: &str = r#"
input CreateJobInput {
  name: JobName!
  image: ImageRef!
  command: String
  gpuCount: IntGe0
  priority: Priority
  env: JSON
}
"#;

/// Statuses after which a job no longer changes
pub const TERMINAL_STATUSES: [&str; 3] = ["completed", "failed", "cancelled"];

pub struct JobCommands {
    operators: OperatorRegistry,
}

impl JobCommands {
    pub fn new() -> Self {
        let mut operators = OperatorRegistry::with_builtins();
        if let Ok(job_name) = Matches::new(
            r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$",
            "lowercase letters, digits and dashes (at most 63 characters)",
        ) {
            operators.register("JobName", job_name);
        }
        if let Ok(image) = Matches::new(
            r"^[A-Za-z0-9][A-Za-z0-9._/-]*(:[A-Za-z0-9._-]+)?(@sha256:[a-f0-9]{64})?$",
            "a container image reference such as 'registry/image:tag'",
        ) {
            operators.register("ImageRef", image);
        }
        operators.register("Priority", OneOf::new(["low", "normal", "high"]));
        Self { operators }
    }

    /// Validation rules for `jobs create` payloads
    pub fn create_spec(&self) -> Result<ValidationSpec> {
        Ok(ValidationSpec::parse(CREATE_JOB_SCHEMA, &self.operators)?.with_example(json!({
            "name": "train-resnet",
            "image": "registry.plexus.dev/vision/resnet:1.4",
            "command": "python train.py --epochs 10",
            "gpuCount": 2,
            "priority": "normal",
        })))
    }
}

impl Default for JobCommands {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandGroup for JobCommands {
    fn name(&self) -> &'static str {
        "jobs"
    }

    fn about(&self) -> &'static str {
        "Submit and inspect jobs in the active group"
    }

    fn declare(&self, actions: &mut ActionSet<'_>) {
        actions
            .add(
                ActionDescriptor::builder("list", "list")
                    .about("List jobs")
                    .option("status", FlagKind::Scalar(ValueType::String), "Only jobs in this status")
                    .option("limit", FlagKind::Scalar(ValueType::Int), "Stop after this many jobs")
                    .build(),
            )
            .add(
                ActionDescriptor::builder("get", "get")
                    .about("Show one job")
                    .arg("name", ValueType::String, "Job name")
                    .returns()
                    .build(),
            )
            .add(
                ActionDescriptor::builder("create", "create")
                    .about("Create a job from a JSON payload (stdin or --file)")
                    .file("file", "Read the payload from this file")
                    .toggle("dry-run", "Validate the payload without submitting it")
                    .returns()
                    .build(),
            )
            .add(
                ActionDescriptor::builder("delete", "delete")
                    .about("Delete a job")
                    .arg("name", ValueType::String, "Job name")
                    .requires_permission()
                    .build(),
            )
            .add(
                ActionDescriptor::builder("wait", "wait")
                    .about("Wait until a job finishes")
                    .arg("name", ValueType::String, "Job name")
                    .option("timeout", FlagKind::Scalar(ValueType::Int), "Give up after this many seconds")
                    .returns()
                    .build(),
            )
            .add(
                ActionDescriptor::builder("logs", "logs")
                    .about("Print job logs")
                    .arg("name", ValueType::String, "Job name")
                    .toggle("follow", "Keep streaming new lines")
                    .option("tail", FlagKind::Scalar(ValueType::Int), "Only the last N lines")
                    .build(),
            )
            .add(
                ActionDescriptor::builder("download", "download")
                    .about("Download a job's output archive")
                    .arg("name", ValueType::String, "Job name")
                    .arg("dest", ValueType::String, "Destination file")
                    .positional_only()
                    .build(),
            );
    }

    fn invoke(&self, ctx: &mut ClientContext, method: &str, call: &Call) -> Result<Option<Value>> {
        match method {
            "list" => list(ctx, call).map(Some),
            "get" => get(ctx, call.str_arg(0)?).map(Some),
            "create" => self.create(ctx, call).map(Some),
            "delete" => delete(ctx, call.str_arg(0)?).map(|_| None),
            "wait" => wait(ctx, call.str_arg(0)?, call.int_option("timeout")).map(Some),
            "logs" => logs(ctx, call).map(|_| None),
            "download" => download(ctx, call.str_arg(0)?, call.str_arg(1)?).map(|_| None),
            _ => Err(unknown_method(self.name(), method)),
        }
    }
}

fn group_id(ctx: &mut ClientContext) -> Result<String> {
    let group = ctx.active_group()?;
    group.id.ok_or(PlexusError::MissingGroup {
        name: Some(group.name),
    })
}

fn list(ctx: &mut ClientContext, call: &Call) -> Result<Value> {
    let group_id = group_id(ctx)?;
    let variables = json!({ "groupId": group_id, "status": call.str_option("status") });
    let pages = ctx.paginate(LIST_JOBS, "jobs", variables);
    let jobs = match call.int_option("limit") {
        Some(n) => pages.take(n.max(0) as usize).collect::<Result<Vec<_>>>()?,
        None => pages.collect::<Result<Vec<_>>>()?,
    };
    if jobs.is_empty() {
        output::info("No jobs found");
    }
    Ok(Value::Array(jobs))
}

fn fetch_job(ctx: &ClientContext, group_id: &str, name: &str) -> Result<Value> {
    let data = ctx.request(GET_JOB, json!({ "groupId": group_id, "name": name }))?;
    match data.get("job") {
        Some(job) if !job.is_null() => Ok(job.clone()),
        _ => Err(PlexusError::not_found("Job", name, "name")),
    }
}

fn get(ctx: &mut ClientContext, name: &str) -> Result<Value> {
    let group_id = group_id(ctx)?;
    fetch_job(ctx, &group_id, name)
}

/// Name clashes are a payload problem, not an API failure.
pub(crate) fn already_exists(error: &GraphqlError) -> Option<PlexusError> {
    error
        .message
        .contains("already exists")
        .then(|| PlexusError::validation(format!("{}. Choose another job name.", error.message)))
}

impl JobCommands {
    fn create(&self, ctx: &mut ClientContext, call: &Call) -> Result<Value> {
        let file = call.str_option("file").map(Path::new);
        let input = payload::load_payload(file)?;
        self.submit(ctx, input, call.flag("dry-run"))
    }

    fn submit(&self, ctx: &mut ClientContext, input: Value, dry_run: bool) -> Result<Value> {
        self.create_spec()?.validate(&input)?;

        if dry_run {
            output::info("Payload is valid; nothing was submitted");
            return Ok(input);
        }

        let group_id = group_id(ctx)?;
        let data = ctx.transport().request(
            CREATE_JOB,
            json!({ "groupId": group_id, "input": input }),
            Some(&already_exists),
        )?;
        Ok(data.get("createJob").cloned().unwrap_or(Value::Null))
    }
}

fn delete(ctx: &mut ClientContext, name: &str) -> Result<()> {
    let group_id = group_id(ctx)?;
    let data = ctx.request(DELETE_JOB, json!({ "groupId": group_id, "name": name }))?;
    if data.get("deleteJob").is_none_or(Value::is_null) {
        return Err(PlexusError::not_found("Job", name, "name"));
    }
    output::success(&format!("Job '{}' deleted", name));
    Ok(())
}

pub fn is_finished(job: &Value) -> bool {
    job.get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| TERMINAL_STATUSES.contains(&status))
}

fn wait(ctx: &mut ClientContext, name: &str, timeout: Option<i64>) -> Result<Value> {
    let group_id = group_id(ctx)?;
    let timeout = timeout.map(|secs| Duration::from_secs(secs.max(0) as u64));
    output::info(&format!("Waiting for job '{}'...", name));

    let ctx: &ClientContext = ctx;
    let job = wait_for(|| fetch_job(ctx, &group_id, name), is_finished, timeout, POLL_INTERVAL)?;
    if !is_finished(&job) {
        output::warning(&format!("Job '{}' is still running", name));
    }
    Ok(job)
}

fn logs(ctx: &mut ClientContext, call: &Call) -> Result<()> {
    let name = call.str_arg(0)?;
    let group_id = group_id(ctx)?;
    let endpoint = format!("/jobs/{}/{}/logs", group_id, name);
    let tail = call.int_option("tail").map(|n| n.max(0) as u64);

    let lines = ctx.transport().request_logs(&endpoint, call.flag("follow"), tail)?;
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{}", line?)?;
        if output::is_interrupted() {
            break;
        }
    }
    Ok(())
}

fn download(ctx: &mut ClientContext, name: &str, dest: &str) -> Result<()> {
    let dest = paths::normalize(Path::new(dest))?;
    let group_id = group_id(ctx)?;
    let endpoint = format!("/jobs/{}/{}/output", group_id, name);

    ctx.transport().request_file(&endpoint, &dest)?;
    output::success(&format!("Saved output of '{}' to {}", name, dest.display()));
    Ok(())
}
