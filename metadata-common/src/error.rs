//! Common error types for the metadata server

use thiserror::Error;

/// Common result type for metadata-common operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the server crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
