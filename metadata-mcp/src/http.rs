//! Shared upstream HTTP plumbing
//!
//! Every provider adapter sends at most one request per call through
//! [`send`], which races the request against the caller's cancellation
//! token and maps transport/status failures onto [`ToolError`].

use crate::error::ToolError;
use metadata_common::USER_AGENT;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Build a reqwest client carrying the browser User-Agent
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ToolError::Network(format!("failed to build HTTP client: {}", e)))
}

/// Send a request, requiring a 200 OK response
pub async fn send(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<Response, ToolError> {
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ToolError::Cancelled),
        result = request.send() => result.map_err(map_transport_error)?,
    };

    let status = response.status();
    if status != StatusCode::OK {
        let url = response.url().to_string();
        tracing::debug!(status = status.as_u16(), url = %url, "Upstream returned non-200 status");
        return Err(ToolError::UpstreamStatus {
            status: status.as_u16(),
            url,
        });
    }

    Ok(response)
}

/// Send a request and read the body as text
pub async fn get_text(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<String, ToolError> {
    let response = send(request, cancel).await?;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ToolError::Cancelled),
        body = response.text() => body.map_err(read_body_error),
    }
}

/// Send a request and decode the body as JSON
pub async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<T, ToolError> {
    let response = send(request, cancel).await?;
    let bytes = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ToolError::Cancelled),
        body = response.bytes() => body.map_err(read_body_error)?,
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| ToolError::Parse(format!("invalid JSON response: {}", e)))
}

fn read_body_error(e: reqwest::Error) -> ToolError {
    ToolError::Network(format!("failed to read response body: {}", e))
}

fn map_transport_error(e: reqwest::Error) -> ToolError {
    if e.is_timeout() {
        ToolError::Network(format!("request timed out: {}", e))
    } else {
        ToolError::Network(format!("failed to send request: {}", e))
    }
}
