//! Error types for metadata-mcp
//!
//! [`ToolError`] is the taxonomy every tool and provider adapter reports.
//! [`ApiError`] maps it onto HTTP status codes for the REST surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Tool and provider errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Transport failure reaching an upstream provider (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with something other than 200 OK
    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// Upstream HTML or JSON did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Alias document is not a JSON object of string arrays
    #[error("Malformed alias store {path}: {reason}")]
    MalformedStore { path: String, reason: String },

    /// Alias document could not be read
    #[error("Alias store unavailable {path}: {reason}")]
    StoreUnavailable { path: String, reason: String },

    /// Alias document could not be written; the previous document is intact
    #[error("Alias store write failed {path}: {reason}")]
    StoreWrite { path: String, reason: String },

    /// Tool arguments failed validation
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Caller cancelled the request or the server is shutting down
    #[error("Request cancelled")]
    Cancelled,
}

impl ToolError {
    /// Whether an external retry policy may reasonably try again.
    ///
    /// Transport failures and 5xx responses are transient; 4xx and
    /// everything local are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ToolError::Network(_) => true,
            ToolError::UpstreamStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn store_unavailable(path: &std::path::Path, reason: impl ToString) -> Self {
        ToolError::StoreUnavailable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed_store(path: &std::path::Path, reason: impl ToString) -> Self {
        ToolError::MalformedStore {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn store_write(path: &std::path::Path, reason: impl ToString) -> Self {
        ToolError::StoreWrite {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Tool failure, status chosen by error kind
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Tool(ref err) => {
                let (status, code) = match err {
                    ToolError::InvalidArguments(_) => {
                        (StatusCode::BAD_REQUEST, "INVALID_ARGUMENTS")
                    }
                    ToolError::Network(_) => (StatusCode::BAD_GATEWAY, "NETWORK_ERROR"),
                    ToolError::UpstreamStatus { .. } => {
                        (StatusCode::BAD_GATEWAY, "UPSTREAM_STATUS")
                    }
                    ToolError::Parse(_) => (StatusCode::BAD_GATEWAY, "PARSE_ERROR"),
                    ToolError::MalformedStore { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_STORE")
                    }
                    ToolError::StoreUnavailable { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
                    }
                    ToolError::StoreWrite { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "STORE_WRITE_ERROR")
                    }
                    ToolError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
                };
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
