//! ThePornDB scene and movie search

use crate::error::ToolError;
use crate::http;
use crate::mcp::registry::{parse_arguments, to_output, Tool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const TPDB_BASE_URL: &str = "https://api.theporndb.net";
const TPDB_LIMIT_VIDEO_PER_TYPE: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<VideoInfo>,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    slug: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    performers: Vec<Performer>,
}

#[derive(Debug, Deserialize)]
struct Performer {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchVideosInput {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoItem {
    /// Slug; used to rename files
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub actors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchVideosOutput {
    pub results: Vec<VideoItem>,
}

fn to_items(response: SearchResponse) -> Vec<VideoItem> {
    response
        .data
        .into_iter()
        .take(TPDB_LIMIT_VIDEO_PER_TYPE)
        .map(|video| VideoItem {
            id: video.slug,
            title: video.title,
            description: video.description.unwrap_or_default(),
            kind: video.kind,
            date: video.date.unwrap_or_default(),
            actors: video.performers.into_iter().map(|p| p.name).collect(),
        })
        .collect()
}

/// ThePornDB API client
pub struct ThePornDb {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ThePornDb {
    pub fn new(api_token: String, timeout: Duration) -> Result<Self, ToolError> {
        Self::with_base_url(TPDB_BASE_URL, api_token, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_token: String,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            base_url: base_url.into(),
            api_token,
        })
    }

    async fn search_kind(
        &self,
        kind: &str,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<VideoItem>, ToolError> {
        let request = self
            .http_client
            .get(format!("{}/{}", self.base_url, kind))
            .bearer_auth(&self.api_token)
            .query(&[("q", query)]);
        let response: SearchResponse = http::get_json(request, cancel).await?;
        Ok(to_items(response))
    }

    /// Scenes first, then movies
    pub async fn search_videos(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<VideoItem>, ToolError> {
        let mut results = self.search_kind("scenes", query, cancel).await?;
        let movies = self.search_kind("movies", query, cancel).await?;
        tracing::debug!(
            query = %query,
            scenes = results.len(),
            movies = movies.len(),
            "ThePornDB search"
        );
        results.extend(movies);
        Ok(results)
    }
}

#[async_trait]
impl Tool for ThePornDb {
    fn name(&self) -> &'static str {
        "search_porn"
    }

    fn description(&self) -> &'static str {
        "Search Non-Japanese Porns"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": concat!(
                        "the name of the video to search for, ",
                        "don't include release date and studio prefix, ",
                        "don't use dash or dot spliter"
                    )
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: SearchVideosInput = parse_arguments(arguments)?;
        let results = self.search_videos(&input.query, &cancel).await?;
        to_output(&SearchVideosOutput { results })
    }
}
