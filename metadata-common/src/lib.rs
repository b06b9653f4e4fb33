//! # metadata-common
//!
//! Shared code for the metadata MCP server:
//! - Error types
//! - Configuration loading (TOML file or environment) and validation
//! - The browser User-Agent every upstream request carries

pub mod config;
pub mod error;

pub use config::{Config, LoggingConfig};
pub use error::{Error, Result};

/// Browser User-Agent sent to every upstream provider.
///
/// Several providers (notably the actor search page) reject or degrade
/// responses for non-browser agents.
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36"
);
