//! HTTP surface: the MCP endpoint plus a plain REST view of the same tools

pub mod health;
pub mod mcp;
pub mod tools;

pub use health::health_routes;
pub use mcp::mcp_routes;
pub use tools::tool_routes;
