//! `groups` command group

use crate::client::ClientContext;
use crate::dispatch::{Call, CommandGroup, unknown_method};
use crate::error::{PlexusError, Result};
use crate::registry::{ActionDescriptor, ActionSet, FlagKind, ValueType};
use crate::ui as output;
use serde_json::{Value, json};

const LIST_GROUPS: &str = r#"
query ListGroups($first: Int, $after: String) {
  groups(first: $first, after: $after) {
    edges {
      cursor
      node { id name displayName }
    }
  }
}
"#;

const GET_GROUP: &str = r#"
query GetGroup($name: String!) {
  group(name: $name) {
    id
    name
    displayName
    createdAt
  }
}
"#;

pub struct GroupCommands;

impl CommandGroup for GroupCommands {
    fn name(&self) -> &'static str {
        "groups"
    }

    fn about(&self) -> &'static str {
        "Browse the groups you belong to"
    }

    fn declare(&self, actions: &mut ActionSet<'_>) {
        actions
            .add(
                ActionDescriptor::builder("list", "list")
                    .about("List groups")
                    .option("limit", FlagKind::Scalar(ValueType::Int), "Stop after this many groups")
                    .build(),
            )
            .add(
                ActionDescriptor::builder("get", "get")
                    .about("Show one group")
                    .arg("name", ValueType::String, "Group name")
                    .returns()
                    .build(),
            );
    }

    fn invoke(&self, ctx: &mut ClientContext, method: &str, call: &Call) -> Result<Option<Value>> {
        match method {
            "list" => list(ctx, call.int_option("limit")).map(Some),
            "get" => get(ctx, call.str_arg(0)?).map(Some),
            _ => Err(unknown_method(self.name(), method)),
        }
    }
}

fn list(ctx: &ClientContext, limit: Option<i64>) -> Result<Value> {
    let pages = ctx.paginate(LIST_GROUPS, "groups", json!({}));
    let groups = match limit {
        Some(n) => pages.take(n.max(0) as usize).collect::<Result<Vec<_>>>()?,
        None => pages.collect::<Result<Vec<_>>>()?,
    };
    if groups.is_empty() {
        output::info("No groups found");
    }
    Ok(Value::Array(groups))
}

fn get(ctx: &ClientContext, name: &str) -> Result<Value> {
    let data = ctx.request(GET_GROUP, json!({ "name": name }))?;
    match data.get("group") {
        Some(group) if !group.is_null() => Ok(group.clone()),
        _ => Err(PlexusError::not_found("Group", name, "name")),
    }
}
