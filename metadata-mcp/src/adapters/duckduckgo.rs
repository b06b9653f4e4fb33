//! Web search through the DuckDuckGo HTML endpoint

use crate::error::ToolError;
use crate::http;
use crate::mcp::registry::{parse_arguments, to_output, Tool};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DDG_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const DDG_MAX_RESULTS: usize = 10;
const NO_RESULTS: &str = "No good DuckDuckGo Search Results was found";

// Safe: constant selectors
static RESULT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".results .web-result").expect("static selector is valid"));
static RESULT_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__a").expect("static selector is valid"));
static RESULT_SNIPPET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("static selector is valid"));

#[derive(Debug, Deserialize)]
pub struct SearchInput {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub results: String,
}

/// One organic search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// DuckDuckGo search client
pub struct DuckDuckGo {
    http_client: reqwest::Client,
    search_url: String,
}

impl DuckDuckGo {
    pub fn new(timeout: Duration) -> Result<Self, ToolError> {
        Self::with_search_url(DDG_SEARCH_URL, timeout)
    }

    pub fn with_search_url(
        search_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            search_url: search_url.into(),
        })
    }

    pub async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchHit>, ToolError> {
        let request = self.http_client.get(&self.search_url).query(&[("q", query)]);
        let body = http::get_text(request, cancel).await?;
        let hits = parse_results(&body, DDG_MAX_RESULTS);
        tracing::debug!(query = %query, hits = hits.len(), "DuckDuckGo search finished");
        Ok(hits)
    }
}

/// Extract up to `limit` hits from a DuckDuckGo HTML result page
pub fn parse_results(html: &str, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT)
        .filter_map(|result| {
            let link = result.select(&RESULT_LINK).next()?;
            let title = element_text(link);
            if title.is_empty() {
                return None;
            }
            let url = link.value().attr("href").map(unwrap_redirect).unwrap_or_default();
            let description = result
                .select(&RESULT_SNIPPET)
                .next()
                .map(element_text)
                .unwrap_or_default();
            Some(SearchHit { title, description, url })
        })
        .take(limit)
        .collect()
}

/// Render hits the way agents consume them: one paragraph per hit
pub fn format_results(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    hits.iter()
        .map(|hit| {
            format!(
                "Title: {}\nDescription: {}\nURL: {}\n\n",
                hit.title, hit.description, hit.url
            )
        })
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// DuckDuckGo wraps result links as `//duckduckgo.com/l/?uddg=<target>`
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    reqwest::Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}

#[async_trait]
impl Tool for DuckDuckGo {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Performs a web search using DuckDuckGo and returns the search results."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "the search query" }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: SearchInput = parse_arguments(arguments)?;
        let hits = self.search(&input.query, &cancel).await?;
        to_output(&SearchOutput {
            results: format_results(&hits),
        })
    }
}
