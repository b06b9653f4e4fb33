//! Shared integration test utilities
//!
//! - [`test_config`]: a validated config pointing at a temporary alias file
//! - [`spawn_upstream`]: a local axum server standing in for a provider

#![allow(dead_code)]

use axum::Router;
use metadata_common::Config;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use tempfile::TempDir;

/// Config with dummy credentials and the alias document at `alias_file`
pub fn test_config(alias_file: &Path) -> Config {
    let env: HashMap<&str, String> = [
        ("TMDB_API_KEY", "test-tmdb".to_string()),
        ("THEPORNDB_API_KEY", "test-tpdb".to_string()),
        ("METATUBE_API_URL", "http://127.0.0.1:1".to_string()),
        ("REQUEST_TIMEOUT_SECS", "5".to_string()),
        ("JAV_ACTOR_ALIAS_FILE", alias_file.display().to_string()),
    ]
    .into_iter()
    .collect();

    Config::from_lookup(|key| env.get(key).cloned()).unwrap()
}

/// Temporary directory holding an alias document with `content`
///
/// Returns (TempDir, path) - TempDir must be kept alive for duration of test
pub fn alias_file_with(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("jav_actor_alias.json");
    std::fs::write(&path, content).unwrap();
    (temp_dir, path)
}

/// Serve `router` on an ephemeral local port
pub async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Read an alias document back as a plain JSON value
pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
