//! TMDB movie and TV search
//!
//! Each search hit is enriched with a second lookup (credits for movies,
//! details + credits for TV). Enrichment failures are logged and leave the
//! extra fields empty rather than failing the whole search.

use crate::error::ToolError;
use crate::http;
use crate::mcp::registry::{parse_arguments, to_output, Tool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_LIMIT_ACTORS_COUNT: usize = 10;
const ACTING_DEPARTMENT: &str = "Acting";

// ---- upstream response shapes ----

#[derive(Debug, Deserialize)]
struct Paged<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MovieResult {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    original_title: String,
    #[serde(default)]
    original_language: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    release_date: String,
}

#[derive(Debug, Deserialize)]
struct TvResult {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    original_name: String,
    #[serde(default)]
    original_language: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    first_air_date: String,
}

#[derive(Debug, Default, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    #[serde(default)]
    name: String,
    #[serde(default)]
    original_name: String,
    #[serde(default)]
    known_for_department: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvDetails {
    #[serde(default)]
    seasons: Vec<SeasonResult>,
    #[serde(default)]
    credits: Credits,
}

#[derive(Debug, Deserialize)]
struct SeasonResult {
    #[serde(default)]
    name: String,
    #[serde(default)]
    season_number: i32,
    #[serde(default)]
    episode_count: i32,
    #[serde(default)]
    air_date: Option<String>,
}

// ---- tool shapes ----

#[derive(Debug, Deserialize)]
pub struct SearchMovieInput {
    pub name: String,
    #[serde(default)]
    pub year: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchTvShowInput {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub original_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieItem {
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    pub overview: String,
    pub release_date: String,
    pub actors: Vec<Actor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TvShowSeason {
    pub name: String,
    pub season_number: i32,
    pub episode_count: i32,
    pub air_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TvShowItem {
    pub name: String,
    pub original_name: String,
    pub original_language: String,
    pub overview: String,
    pub first_air_date: String,
    pub actors: Vec<Actor>,
    pub seasons: Vec<TvShowSeason>,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput<T> {
    pub results: Vec<T>,
}

fn acting_cast(credits: Credits) -> Vec<Actor> {
    credits
        .cast
        .into_iter()
        .filter(|c| c.known_for_department.as_deref() == Some(ACTING_DEPARTMENT))
        .take(TMDB_LIMIT_ACTORS_COUNT)
        .map(|c| Actor {
            name: c.name,
            original_name: c.original_name,
        })
        .collect()
}

/// TMDB API client
pub struct Tmdb {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl Tmdb {
    pub fn new(api_key: String, language: String, timeout: Duration) -> Result<Self, ToolError> {
        Self::with_base_url(TMDB_BASE_URL, api_key, language, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: String,
        language: String,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            base_url: base_url.into(),
            api_key,
            language,
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
    }

    pub async fn search_movies(
        &self,
        input: &SearchMovieInput,
        cancel: &CancellationToken,
    ) -> Result<Vec<MovieItem>, ToolError> {
        let mut request = self
            .get("/search/movie")
            .query(&[("query", input.name.as_str()), ("include_adult", "true")]);
        if let Some(year) = input.year.filter(|y| *y != 0) {
            request = request.query(&[("year", year.to_string())]);
        }

        let page: Paged<MovieResult> = http::get_json(request, cancel).await?;
        tracing::debug!(name = %input.name, hits = page.results.len(), "TMDB movie search");

        let mut results = Vec::with_capacity(page.results.len());
        for movie in page.results {
            let credits = self.get(&format!("/movie/{}/credits", movie.id));
            let actors = match http::get_json::<Credits>(credits, cancel).await {
                Ok(credits) => acting_cast(credits),
                Err(ToolError::Cancelled) => return Err(ToolError::Cancelled),
                Err(e) => {
                    tracing::warn!(movie_id = movie.id, error = %e, "Error getting movie credits");
                    Vec::new()
                }
            };
            results.push(MovieItem {
                title: movie.title,
                original_title: movie.original_title,
                original_language: movie.original_language,
                overview: movie.overview,
                release_date: movie.release_date,
                actors,
            });
        }
        Ok(results)
    }

    pub async fn search_tv_shows(
        &self,
        input: &SearchTvShowInput,
        cancel: &CancellationToken,
    ) -> Result<Vec<TvShowItem>, ToolError> {
        let request = self
            .get("/search/tv")
            .query(&[("query", input.name.as_str()), ("include_adult", "true")]);

        let page: Paged<TvResult> = http::get_json(request, cancel).await?;
        tracing::debug!(name = %input.name, hits = page.results.len(), "TMDB TV search");

        let mut results = Vec::with_capacity(page.results.len());
        for show in page.results {
            let mut item = TvShowItem {
                name: show.name,
                original_name: show.original_name,
                original_language: show.original_language,
                overview: show.overview,
                first_air_date: show.first_air_date,
                actors: Vec::new(),
                seasons: Vec::new(),
            };

            let details = self
                .get(&format!("/tv/{}", show.id))
                .query(&[("append_to_response", "credits")]);
            match http::get_json::<TvDetails>(details, cancel).await {
                Ok(details) => {
                    item.seasons = details
                        .seasons
                        .into_iter()
                        .map(|s| TvShowSeason {
                            name: s.name,
                            season_number: s.season_number,
                            episode_count: s.episode_count,
                            air_date: s.air_date.unwrap_or_default(),
                        })
                        .collect();
                    item.actors = acting_cast(details.credits);
                }
                Err(ToolError::Cancelled) => return Err(ToolError::Cancelled),
                Err(e) => {
                    tracing::warn!(tv_id = show.id, error = %e, "Error getting tv details");
                }
            }
            results.push(item);
        }
        Ok(results)
    }
}

/// `search_movies`
pub struct SearchMoviesTool {
    client: Arc<Tmdb>,
}

impl SearchMoviesTool {
    pub fn new(client: Arc<Tmdb>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SearchMoviesTool {
    fn name(&self) -> &'static str {
        "search_movies"
    }

    fn description(&self) -> &'static str {
        "Search for movies on TMDB by given name (required) and year (optional)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "the name of the movie or tv show to search for"
                },
                "year": {
                    "type": "integer",
                    "description": "(optional) the year of the movie released"
                }
            },
            "required": ["name"]
        })
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: SearchMovieInput = parse_arguments(arguments)?;
        let results = self.client.search_movies(&input, &cancel).await?;
        to_output(&SearchOutput { results })
    }
}

/// `search_tv_shows`
pub struct SearchTvShowsTool {
    client: Arc<Tmdb>,
}

impl SearchTvShowsTool {
    pub fn new(client: Arc<Tmdb>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SearchTvShowsTool {
    fn name(&self) -> &'static str {
        "search_tv_shows"
    }

    fn description(&self) -> &'static str {
        "Search for tv shows on TMDB by given name."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "the name of the movie or tv show to search for"
                }
            },
            "required": ["name"]
        })
    }

    async fn call(&self, arguments: Value, cancel: CancellationToken) -> Result<Value, ToolError> {
        let input: SearchTvShowInput = parse_arguments(arguments)?;
        let results = self.client.search_tv_shows(&input, &cancel).await?;
        to_output(&SearchOutput { results })
    }
}
