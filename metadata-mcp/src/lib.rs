//! metadata-mcp library interface
//!
//! Exposes the tool registry, MCP dispatch and HTTP router so integration
//! tests can drive the server without binding a socket.

pub mod adapters;
pub mod alias;
pub mod api;
pub mod error;
pub mod http;
pub mod mcp;

pub use crate::error::{ApiError, ApiResult, ToolError};

use axum::Router;
use chrono::{DateTime, Utc};
use metadata_common::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::alias::{AliasScraper, AliasStore};
use crate::mcp::{McpHandler, ToolRegistry};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// MCP dispatcher over the registered tools
    pub handler: Arc<McpHandler>,
    /// Cancelled on shutdown; every tool call runs under a child token
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(registry: ToolRegistry, shutdown: CancellationToken) -> Self {
        Self {
            handler: Arc::new(McpHandler::new(Arc::new(registry))),
            shutdown,
            startup_time: Utc::now(),
        }
    }
}

/// Build the full tool registry for `config`
pub fn build_registry(config: &Config) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    adapters::register_tools(&mut registry, config)?;

    let scraper = Arc::new(AliasScraper::new(config.request_timeout())?);
    alias::register_tools(&mut registry, scraper, AliasStore::new(config.alias_file()));

    Ok(registry)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::mcp_routes())
        .merge(api::tool_routes())
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
