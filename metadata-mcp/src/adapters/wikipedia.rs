//! Wikipedia search and page content via the MediaWiki action API

use crate::error::ToolError;
use crate::http;
use crate::mcp::registry::{parse_arguments, to_output, Tool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SEARCH_LIMIT: &str = "3";
const SUMMARY_SENTENCES: &str = "5";

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    query: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchInput {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchItem {
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub results: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct PageInput {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct PageOutput {
    pub content: String,
}

/// Wikipedia client bound to one language edition
pub struct Wikipedia {
    http_client: reqwest::Client,
    api_url: String,
}

impl Wikipedia {
    pub fn new(language: &str, timeout: Duration) -> Result<Self, ToolError> {
        Self::with_api_url(format!("https://{}.wikipedia.org/w/api.php", language), timeout)
    }

    pub fn with_api_url(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ToolError> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            api_url: api_url.into(),
        })
    }

    /// Search titles, then attach each page's intro summary
    ///
    /// A failed summary lookup leaves that summary empty.
    pub async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchItem>, ToolError> {
        let request = self.http_client.get(&self.api_url).query(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", SEARCH_LIMIT),
            ("format", "json"),
            ("formatversion", "2"),
        ]);
        let response: QueryResponse<SearchQuery> = http::get_json(request, cancel).await?;
        let titles: Vec<String> = response
            .query
            .map(|q| q.search.into_iter().map(|e| e.title).collect())
            .unwrap_or_default();

        let mut results = Vec::with_capacity(titles.len());
        for title in titles {
            let summary = match self.extract(&title, true, cancel).await {
                Ok(summary) => summary,
                Err(ToolError::Cancelled) => return Err(ToolError::Cancelled),
                Err(e) => {
                    tracing::warn!(title = %title, error = %e, "Failed to get Wikipedia summary");
                    String::new()
                }
            };
            results.push(SearchItem { title, summary });
        }
        Ok(results)
    }

    /// Full plain-text content of a page
    pub async fn page(&self, title: &str, cancel: &CancellationToken) -> Result<String, ToolError> {
        self.extract(title, false, cancel).await
    }

    async fn extract(
        &self,
        title: &str,
        intro_only: bool,
        cancel: &CancellationToken,
    ) -> Result<String, ToolError> {
        let mut params = vec![
            ("action", "query"),
            ("prop", "extracts"),
            ("explaintext", "1"),
            ("redirects", "1"),
            ("titles", title),
            ("format", "json"),
            ("formatversion", "2"),
        ];
        if intro_only {
            params.push(("exintro", "1"));
            params.push(("exsentences", SUMMARY_SENTENCES));
        }

        let request = self.http_client.get(&self.api_url).query(&params);
        let response: QueryResponse<PagesQuery> = http::get_json(request, cancel).await?;
        page_extract(response, title)
    }
}

fn page_extract(response: QueryResponse<PagesQuery>, title: &str) -> Result<String, ToolError> {
    let page = response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .filter(|p| !p.missing)
        .ok_or_else(|| ToolError::Parse(format!("page not found: {}", title)))?;
    Ok(page.extract.unwrap_or_default())
}

/// `wikipedia_search`
pub struct WikipediaSearchTool {
    client: Arc<Wikipedia>,
}

impl WikipediaSearchTool {
    pub fn new(client: Arc<Wikipedia>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WikipediaSearchTool {
    fn name(&self) -> &'static str {
        "wikipedia_search"
    }

    fn description(&self) -> &'static str {
        "Search for Wikipedia pages by given query."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: SearchInput = parse_arguments(arguments)?;
        let results = self.client.search(&input.query, &cancel).await?;
        to_output(&SearchOutput { results })
    }
}

/// `wikipedia_page`
pub struct WikipediaPageTool {
    client: Arc<Wikipedia>,
}

impl WikipediaPageTool {
    pub fn new(client: Arc<Wikipedia>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WikipediaPageTool {
    fn name(&self) -> &'static str {
        "wikipedia_page"
    }

    fn description(&self) -> &'static str {
        "Get the content of a Wikipedia page by given title."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "title": { "type": "string" } },
            "required": ["title"]
        })
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: PageInput = parse_arguments(arguments)?;
        let content = self.client.page(&input.title, &cancel).await?;
        to_output(&PageOutput { content })
    }
}
