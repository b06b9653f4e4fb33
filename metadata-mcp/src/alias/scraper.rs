//! Remote actor alias scraper
//!
//! Looks an actor up on the JAVDB actor search page and reads the alias
//! list out of the first result's `.actor-box a[title]`, which the site
//! renders as `"name1, name2, ..."`.

use crate::error::ToolError;
use crate::http;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const JAVDB_SEARCH_URL: &str = "https://javdb.com/search";
const ALIAS_SEPARATOR: &str = ", ";

// Safe: constant selector
static ACTOR_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".actor-box a").expect("static selector is valid"));

/// Actor alias scraper
pub struct AliasScraper {
    http_client: reqwest::Client,
    search_url: String,
}

impl AliasScraper {
    pub fn new(timeout: Duration) -> Result<Self, ToolError> {
        Self::with_search_url(JAVDB_SEARCH_URL, timeout)
    }

    /// Point the scraper at a different search endpoint (local test servers)
    pub fn with_search_url(
        search_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            search_url: search_url.into(),
        })
    }

    /// Search aliases for `name`
    ///
    /// An empty result means the actor was not found; that is not an error.
    pub async fn search_alias(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ToolError> {
        let request = self
            .http_client
            .get(&self.search_url)
            .query(&[("f", "actor"), ("q", name)]);

        tracing::debug!(name = %name, url = %self.search_url, "Searching actor aliases");

        let body = http::get_text(request, cancel).await?;
        let aliases = parse_actor_aliases(&body);

        tracing::info!(name = %name, count = aliases.len(), "Actor alias search finished");
        Ok(aliases)
    }
}

/// Extract the alias list from an actor search result page
pub fn parse_actor_aliases(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&ACTOR_LINK)
        .next()
        .and_then(|link| link.value().attr("title"))
        .map(|title| title.split(ALIAS_SEPARATOR).map(str::to_string).collect())
        .unwrap_or_default()
}
