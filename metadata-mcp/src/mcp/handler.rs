//! MCP method dispatch

use crate::mcp::protocol::{
    error_codes, CallToolParams, CallToolResult, JsonRpcRequest, JsonRpcResponse, ToolDescriptor,
    DEFAULT_PROTOCOL_VERSION, JSONRPC_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::mcp::registry::ToolRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const SERVER_NAME: &str = "metadata-mcp-server";

/// Answers MCP JSON-RPC requests against a tool registry
pub struct McpHandler {
    registry: Arc<ToolRegistry>,
}

impl McpHandler {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle(
        &self,
        request: JsonRpcRequest,
        cancel: CancellationToken,
    ) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("unsupported jsonrpc version '{}'", request.jsonrpc),
            ));
        }

        let params = request.params.unwrap_or(Value::Null);
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize(&params)),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.list_tools()),
            "tools/call" => match serde_json::from_value::<CallToolParams>(params) {
                Ok(call) => match self.call_tool(call, cancel).await {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err((code, message)) => JsonRpcResponse::error(id, code, message),
                },
                Err(e) => JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("invalid tools/call params: {}", e),
                ),
            },
            other => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("method not found: {}", other),
            ),
        };
        Some(response)
    }

    /// Echo the client's protocol revision when supported, else offer ours
    fn initialize(&self, params: &Value) -> Value {
        let requested = params.get("protocolVersion").and_then(Value::as_str);
        let protocol_version = match requested {
            Some(version) if SUPPORTED_PROTOCOL_VERSIONS.iter().any(|v| *v == version) => version,
            Some(version) => {
                debug!(
                    requested = %version,
                    offered = DEFAULT_PROTOCOL_VERSION,
                    "Unsupported protocol version"
                );
                DEFAULT_PROTOCOL_VERSION
            }
            None => DEFAULT_PROTOCOL_VERSION,
        };

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<ToolDescriptor> = self
            .registry
            .list()
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn call_tool(
        &self,
        call: CallToolParams,
        cancel: CancellationToken,
    ) -> Result<Value, (i32, String)> {
        let tool = self.registry.get(&call.name).ok_or_else(|| {
            (
                error_codes::INVALID_PARAMS,
                format!("unknown tool: {}", call.name),
            )
        })?;

        let started = Instant::now();
        let result = match tool.call(call.arguments, cancel).await {
            Ok(output) => {
                debug!(
                    tool = %call.name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Tool call succeeded"
                );
                CallToolResult::success(output)
            }
            Err(e) => {
                warn!(
                    tool = %call.name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Tool call failed"
                );
                CallToolResult::failure(e.to_string())
            }
        };

        serde_json::to_value(result).map_err(|e| (error_codes::INTERNAL_ERROR, e.to_string()))
    }
}
