//! Generic URL fetch, optionally converted to Markdown

use crate::error::ToolError;
use crate::http;
use crate::mcp::registry::{parse_arguments, to_output, Tool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Wrap width for converted output
const MARKDOWN_WIDTH: usize = 120;

#[derive(Debug, Deserialize)]
pub struct FetchInput {
    pub url: String,
    #[serde(default)]
    pub convert_to_markdown: bool,
}

#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub content: String,
}

/// Fetches page content
pub struct Fetcher {
    http_client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, ToolError> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
        })
    }

    pub async fn fetch(
        &self,
        input: &FetchInput,
        cancel: &CancellationToken,
    ) -> Result<String, ToolError> {
        let url = reqwest::Url::parse(&input.url).map_err(|e| {
            ToolError::InvalidArguments(format!("invalid url '{}': {}", input.url, e))
        })?;

        tracing::debug!(url = %url, markdown = input.convert_to_markdown, "Fetching URL");
        let content = http::get_text(self.http_client.get(url), cancel).await?;

        if input.convert_to_markdown {
            html_to_markdown(&content)
        } else {
            Ok(content)
        }
    }
}

/// Render HTML as Markdown-flavored text
pub fn html_to_markdown(html: &str) -> Result<String, ToolError> {
    html2text::from_read(html.as_bytes(), MARKDOWN_WIDTH)
        .map_err(|e| ToolError::Parse(format!("failed to convert HTML: {}", e)))
}

#[async_trait]
impl Tool for Fetcher {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn description(&self) -> &'static str {
        "fetch content from given url"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "the url to fetch" },
                "convert_to_markdown": {
                    "type": "boolean",
                    "description":
                        "(optional) whether to convert the content to markdown, default is no"
                }
            },
            "required": ["url"]
        })
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: FetchInput = parse_arguments(arguments)?;
        let content = self.fetch(&input, &cancel).await?;
        to_output(&FetchOutput { content })
    }
}
