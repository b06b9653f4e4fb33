//! Japanese title lookup through a Metatube server
//!
//! AVBASE results carry the richest metadata, so those hits get a
//! follow-up details request for maker, label, series and genres.

use crate::error::ToolError;
use crate::http;
use crate::mcp::registry::{parse_arguments, to_output, Tool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const AVBASE: &str = "AVBASE";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    number: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    provider: String,
    #[serde(default)]
    actors: Vec<String>,
    #[serde(default)]
    release_date: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    data: Details,
}

#[derive(Debug, Default, Deserialize)]
struct Details {
    #[serde(default)]
    maker: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    series: String,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchJavInput {
    pub jav_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Jav {
    pub jav_id: String,
    pub title: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    pub release_date: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub maker: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series: String,
}

impl From<SearchEntry> for Jav {
    fn from(entry: SearchEntry) -> Self {
        Self {
            jav_id: entry.number,
            title: entry.title,
            provider: entry.provider,
            actors: entry.actors,
            release_date: entry.release_date,
            tags: Vec::new(),
            maker: String::new(),
            label: String::new(),
            series: String::new(),
        }
    }
}

impl Jav {
    fn apply_details(&mut self, details: Details) {
        self.maker = details.maker;
        self.label = details.label;
        self.series = details.series;
        self.tags = details.genres;
    }
}

#[derive(Debug, Serialize)]
pub struct SearchJavOutput {
    pub results: Vec<Jav>,
}

/// Metatube API client
pub struct Metatube {
    http_client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl Metatube {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.http_client.get(format!("{}{}", self.api_url, path));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    pub async fn search(
        &self,
        jav_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Jav>, ToolError> {
        let request = self.get("/v1/movies/search").query(&[("q", jav_id)]);
        let response: SearchResponse = http::get_json(request, cancel).await?;
        tracing::debug!(jav_id = %jav_id, hits = response.data.len(), "Metatube search");

        let mut results = Vec::with_capacity(response.data.len());
        for entry in response.data {
            let details_id = (entry.provider == AVBASE).then(|| entry.id.clone());
            let mut jav = Jav::from(entry);

            if let Some(id) = details_id {
                let request = self.get(&format!("/v1/movies/{}/{}", AVBASE, id));
                match http::get_json::<DetailsResponse>(request, cancel).await {
                    Ok(details) => jav.apply_details(details.data),
                    Err(ToolError::Cancelled) => return Err(ToolError::Cancelled),
                    Err(e) => {
                        tracing::warn!(id = %id, error = %e, "Error getting Metatube details");
                    }
                }
            }
            results.push(jav);
        }
        Ok(results)
    }
}

#[async_trait]
impl Tool for Metatube {
    fn name(&self) -> &'static str {
        "search_japanese_porn"
    }

    fn description(&self) -> &'static str {
        concat!(
            "Searches for Japanese and Chinese pornographic content on Metatube ",
            "using a given ID (番号), e.g., 'SSIS-698'."
        )
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "jav_id": {
                    "type": "string",
                    "description": concat!(
                        "the id (番号) of the jav to search for, it usually Studio/Label Prefix ",
                        "(usually 3-4 letters) then dash (-) then number. for example: SSIS-698"
                    )
                }
            },
            "required": ["jav_id"]
        })
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: SearchJavInput = parse_arguments(arguments)?;
        let results = self.search(&input.jav_id, &cancel).await?;
        to_output(&SearchJavOutput { results })
    }
}
