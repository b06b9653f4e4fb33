//! Provider adapters: thin request/response translators for each upstream
//!
//! Every adapter is stateless apart from its HTTP client and credentials.

pub mod duckduckgo;
pub mod fetch;
pub mod metatube;
pub mod theporndb;
pub mod tmdb;
pub mod wikipedia;

use crate::error::ToolError;
use crate::mcp::ToolRegistry;
use metadata_common::Config;
use std::sync::Arc;

/// Register every provider tool configured in `config`
pub fn register_tools(registry: &mut ToolRegistry, config: &Config) -> Result<(), ToolError> {
    let timeout = config.request_timeout();

    registry.register(Arc::new(fetch::Fetcher::new(timeout)?));
    registry.register(Arc::new(duckduckgo::DuckDuckGo::new(timeout)?));

    let wikipedia = Arc::new(wikipedia::Wikipedia::new(&config.wikipedia_language, timeout)?);
    registry.register(Arc::new(wikipedia::WikipediaSearchTool::new(wikipedia.clone())));
    registry.register(Arc::new(wikipedia::WikipediaPageTool::new(wikipedia)));

    let tmdb = Arc::new(tmdb::Tmdb::new(
        config.tmdb_api_key.clone(),
        config.tmdb_response_language.clone(),
        timeout,
    )?);
    registry.register(Arc::new(tmdb::SearchMoviesTool::new(tmdb.clone())));
    registry.register(Arc::new(tmdb::SearchTvShowsTool::new(tmdb)));

    registry.register(Arc::new(theporndb::ThePornDb::new(
        config.theporndb_api_key.clone(),
        timeout,
    )?));
    registry.register(Arc::new(metatube::Metatube::new(
        config.metatube_api_url.clone(),
        config.metatube_api_key.clone(),
        timeout,
    )?));

    Ok(())
}
