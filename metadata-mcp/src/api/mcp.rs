//! POST /mcp: JSON-RPC 2.0 over streamable HTTP (single-response mode)
//!
//! Requests get a JSON body; notifications get `202 Accepted` with no body.
//! Batches are not supported.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::debug;

use crate::mcp::protocol::{error_codes, JsonRpcId, JsonRpcRequest, JsonRpcResponse};
use crate::AppState;

/// POST /mcp
pub async fn handle_mcp(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return rpc_error(error_codes::PARSE_ERROR, format!("parse error: {}", e));
        }
    };

    if value.is_array() {
        return rpc_error(error_codes::INVALID_REQUEST, "batch requests are not supported");
    }

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return rpc_error(error_codes::INVALID_REQUEST, format!("invalid request: {}", e));
        }
    };

    debug!(method = %request.method, "MCP request");
    let cancel = state.shutdown.child_token();
    match state.handler.handle(request, cancel).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

fn rpc_error(code: i32, message: impl Into<String>) -> Response {
    Json(JsonRpcResponse::error(JsonRpcId::Null, code, message)).into_response()
}

/// Build MCP routes
pub fn mcp_routes() -> Router<AppState> {
    Router::new().route("/mcp", post(handle_mcp))
}
