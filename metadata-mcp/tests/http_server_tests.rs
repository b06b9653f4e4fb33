//! HTTP server and MCP routing integration tests
//!
//! Drives the full router with `oneshot`; only the alias tools are called,
//! since they need nothing beyond a temporary alias document.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use metadata_mcp::{build_registry, build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const EXPECTED_TOOLS: &[&str] = &[
    "fetch",
    "jav_actor_add_alias",
    "jav_actor_name_to_dir",
    "search_japanese_porn",
    "search_movies",
    "search_porn",
    "search_tv_shows",
    "web_search",
    "web_search_jav_actor_alias",
    "wikipedia_page",
    "wikipedia_search",
];

/// Router over a fresh alias document
fn test_app(content: &str) -> (TempDir, std::path::PathBuf, Router) {
    let (temp_dir, path) = helpers::alias_file_with(content);
    let config = helpers::test_config(&path);
    let registry = build_registry(&config).unwrap();
    let app = build_router(AppState::new(registry, CancellationToken::new()));
    (temp_dir, path, app)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

async fn post_raw(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn rpc(id: i64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

async fn call_tool(app: Router, name: &str, arguments: Value) -> Value {
    let (status, body) = post_json(
        app,
        "/mcp",
        rpc(7, "tools/call", json!({ "name": name, "arguments": arguments })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    body["result"].clone()
}

#[tokio::test]
async fn test_health_reports_tool_count() {
    let (_tmp, _path, app) = test_app("{}");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["module"], "metadata-mcp");
    assert_eq!(health["tool_count"], EXPECTED_TOOLS.len());
}

#[tokio::test]
async fn test_initialize_handshake() {
    let (_tmp, _path, app) = test_app("{}");

    let (status, body) = post_json(
        app.clone(),
        "/mcp",
        rpc(1, "initialize", json!({ "protocolVersion": "2025-03-26", "capabilities": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["serverInfo"]["name"], "metadata-mcp-server");
    assert!(body["result"]["capabilities"]["tools"].is_object());

    let (status, body) = post_json(
        app,
        "/mcp",
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_tools_list_is_sorted_and_complete() {
    let (_tmp, _path, app) = test_app("{}");

    let (_, body) = post_json(app, "/mcp", rpc(2, "tools/list", json!({}))).await;
    let names: Vec<&str> = body["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, EXPECTED_TOOLS);

    for tool in body["result"]["tools"].as_array().unwrap() {
        assert_eq!(tool["inputSchema"]["type"], "object", "{}", tool["name"]);
    }
}

#[tokio::test]
async fn test_malformed_requests() {
    let (_tmp, _path, app) = test_app("{}");

    let (status, body) = post_raw(app.clone(), "/mcp", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32700);
    assert!(body["id"].is_null());

    let (_, body) = post_json(app.clone(), "/mcp", json!([rpc(1, "ping", json!({}))])).await;
    assert_eq!(body["error"]["code"], -32600);

    let (_, body) = post_json(app.clone(), "/mcp", json!({ "jsonrpc": "2.0", "id": 3 })).await;
    assert_eq!(body["error"]["code"], -32600);

    let (_, body) = post_json(app, "/mcp", rpc(4, "prompts/list", json!({}))).await;
    assert_eq!(body["error"]["code"], -32601);
    assert_eq!(body["id"], 4);
}

#[tokio::test]
async fn test_name_to_dir_over_mcp() {
    let (_tmp, _path, app) = test_app(r#"{"ActorA": ["Alias1", "Alias2"], "ActorB": ["Alias3"]}"#);

    let result = call_tool(app.clone(), "jav_actor_name_to_dir", json!({ "name": "Alias3" })).await;
    assert_eq!(result["isError"], false);
    assert_eq!(result["structuredContent"], json!({ "dir": "ActorB" }));

    let result = call_tool(app, "jav_actor_name_to_dir", json!({ "name": "Nobody" })).await;
    assert_eq!(result["isError"], false);
    assert_eq!(result["structuredContent"], json!({}));
}

#[tokio::test]
async fn test_add_alias_over_mcp_persists() {
    let (_tmp, path, app) = test_app(r#"{"ActorA": ["Alias1", "Alias2"]}"#);

    let result = call_tool(
        app.clone(),
        "jav_actor_add_alias",
        json!({ "name": "New Name", "aliases": ["Alias2", "Alias4"] }),
    )
    .await;
    assert_eq!(result["structuredContent"], json!({ "dir": "ActorA" }));

    let result = call_tool(
        app,
        "jav_actor_add_alias",
        json!({ "name": "ActorC", "aliases": ["Alias5"] }),
    )
    .await;
    assert_eq!(result["structuredContent"], json!({ "dir": "ActorC" }));

    assert_eq!(
        helpers::read_json(&path),
        json!({ "ActorA": ["Alias1", "Alias2", "Alias4"], "ActorC": ["Alias5"] })
    );
}

#[tokio::test]
async fn test_malformed_store_is_tool_error() {
    let (_tmp, _path, app) = test_app("[1, 2, 3]");

    let result = call_tool(app, "jav_actor_name_to_dir", json!({ "name": "Alias1" })).await;
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Malformed alias store"), "{}", text);
}

#[tokio::test]
async fn test_invalid_arguments_are_tool_errors() {
    let (_tmp, _path, app) = test_app("{}");

    let result = call_tool(app.clone(), "jav_actor_add_alias", json!({ "name": "ActorA" })).await;
    assert_eq!(result["isError"], true);

    let arguments = json!({ "name": "ActorA", "aliases": [] });
    let result = call_tool(app, "jav_actor_add_alias", arguments).await;
    assert_eq!(result["isError"], true);
}

#[tokio::test]
async fn test_rest_tool_route() {
    let (_tmp, _path, app) = test_app(r#"{"ActorA": ["Alias1"]}"#);

    let (status, body) = post_json(
        app.clone(),
        "/api/tools/jav_actor_name_to_dir",
        json!({ "name": "Alias1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "dir": "ActorA" }));

    let (status, body) = post_json(app.clone(), "/api/tools/does_not_exist", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) =
        post_json(app, "/api/tools/jav_actor_add_alias", json!({ "name": "X" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_ARGUMENTS");
}

#[tokio::test]
async fn test_rest_tool_route_rejects_bad_body_with_error_json() {
    let (_tmp, _path, app) = test_app(r#"{"ActorA": ["Alias1"]}"#);

    let (status, body) =
        post_raw(app.clone(), "/api/tools/jav_actor_name_to_dir", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // No content-type and no body
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tools/jav_actor_name_to_dir")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().is_some());
}
