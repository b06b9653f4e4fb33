//! Model Context Protocol surface: JSON-RPC types, tool registry, dispatch

pub mod handler;
pub mod protocol;
pub mod registry;

pub use handler::McpHandler;
pub use registry::{Tool, ToolRegistry};
