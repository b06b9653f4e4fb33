//! MCP tools for actor alias search, resolution and merging

use crate::alias::{AliasMerger, AliasResolver, AliasScraper};
use crate::error::ToolError;
use crate::mcp::registry::{parse_arguments, to_output, Tool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
pub struct NameInput {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AliasesOutput {
    pub aliases: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NameToDirOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddAliasInput {
    pub name: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AddAliasOutput {
    pub dir: String,
}

fn name_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": description }
        },
        "required": ["name"]
    })
}

/// `web_search_jav_actor_alias`
pub struct SearchAliasTool {
    scraper: Arc<AliasScraper>,
}

impl SearchAliasTool {
    pub fn new(scraper: Arc<AliasScraper>) -> Self {
        Self { scraper }
    }
}

#[async_trait]
impl Tool for SearchAliasTool {
    fn name(&self) -> &'static str {
        "web_search_jav_actor_alias"
    }

    fn description(&self) -> &'static str {
        "Searches JAVDB for an actor's aliases given one of their names."
    }

    fn input_schema(&self) -> Value {
        name_schema("the name of the actor to search for")
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: NameInput = parse_arguments(arguments)?;
        let aliases = self.scraper.search_alias(&input.name, &cancel).await?;
        to_output(&AliasesOutput { aliases })
    }
}

/// `jav_actor_name_to_dir`
pub struct NameToDirTool {
    resolver: AliasResolver,
}

impl NameToDirTool {
    pub fn new(resolver: AliasResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for NameToDirTool {
    fn name(&self) -> &'static str {
        "jav_actor_name_to_dir"
    }

    fn description(&self) -> &'static str {
        "Determines the directory name used for a JAV actor, given one of their alias names."
    }

    fn input_schema(&self) -> Value {
        name_schema("the name of the actor to search for")
    }

    async fn call(&self, arguments: Value, _cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: NameInput = parse_arguments(arguments)?;
        let dir = self.resolver.resolve_directory(&input.name).await?;
        to_output(&NameToDirOutput { dir })
    }
}

/// `jav_actor_add_alias`
pub struct AddAliasTool {
    merger: AliasMerger,
}

impl AddAliasTool {
    pub fn new(merger: AliasMerger) -> Self {
        Self { merger }
    }
}

#[async_trait]
impl Tool for AddAliasTool {
    fn name(&self) -> &'static str {
        "jav_actor_add_alias"
    }

    fn description(&self) -> &'static str {
        "Adds or updates JAV actor aliases in the system and returns the actor's directory name."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "the best-known name of the actor, this maybe use as dir name"
                },
                "aliases": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description":
                        "all aliases of the actor, should also include the best-known name"
                }
            },
            "required": ["name", "aliases"]
        })
    }

    async fn call(&self, arguments: Value, _cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: AddAliasInput = parse_arguments(arguments)?;
        let dir = self.merger.add_or_update_alias(&input.name, &input.aliases).await?;
        to_output(&AddAliasOutput { dir })
    }
}
