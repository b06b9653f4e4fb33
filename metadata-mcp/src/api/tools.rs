//! REST view of the tool registry
//!
//! `POST /api/tools/:name` runs one tool with the JSON body as its
//! arguments and returns the structured output directly. Failures map onto
//! HTTP status codes through [`ApiError`]; a missing or malformed JSON body
//! is a 400 with the same error body.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::mcp::protocol::ToolDescriptor;
use crate::AppState;

/// GET /api/tools
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolDescriptor>> {
    let tools = state
        .handler
        .registry()
        .list()
        .iter()
        .map(|tool| ToolDescriptor {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.input_schema(),
        })
        .collect();
    Json(tools)
}

/// POST /api/tools/:name
pub async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let tool = state
        .handler
        .registry()
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("tool '{}'", name)))?;
    let Json(arguments) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let output = tool.call(arguments, state.shutdown.child_token()).await?;
    Ok(Json(output))
}

/// Build REST tool routes
pub fn tool_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tools", get(list_tools))
        .route("/api/tools/:name", post(call_tool))
}
