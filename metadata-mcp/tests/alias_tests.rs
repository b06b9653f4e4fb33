//! Actor alias integration tests
//!
//! - Scraper against a local stand-in for the actor search page
//! - Concurrent merges against one document (no lost updates)
//! - Live scrape (ignored by default; needs network access)

mod helpers;

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use metadata_mcp::alias::{AliasMerger, AliasResolver, AliasScraper, AliasStore};
use metadata_mcp::ToolError;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Stand-in search page; like the real site it turns away non-browser agents
async fn actor_search(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, StatusCode> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !user_agent.starts_with("Mozilla/5.0") {
        return Err(StatusCode::FORBIDDEN);
    }

    assert_eq!(params.get("f").map(String::as_str), Some("actor"));
    let body = match params.get("q").map(String::as_str) {
        Some("藤森里穂") => {
            r#"<div class="actor-box"><a href="/actors/x" title="藤森里穂, 井上遥香"></a></div>"#
        }
        _ => "<div class=\"empty-message\">No content yet</div>",
    };
    Ok(Html(body.to_string()))
}

async fn upstream_search_url() -> String {
    let router = Router::new().route("/search", get(actor_search));
    let addr = helpers::spawn_upstream(router).await;
    format!("http://{}/search", addr)
}

async fn upstream_scraper() -> AliasScraper {
    AliasScraper::with_search_url(upstream_search_url().await, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_scraper_reads_first_actor_box() {
    let scraper = upstream_scraper().await;
    let aliases = scraper
        .search_alias("藤森里穂", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(aliases, vec!["藤森里穂", "井上遥香"]);
}

#[tokio::test]
async fn test_scraper_sends_browser_user_agent() {
    let url = upstream_search_url().await;

    // A client without a browser agent is refused by the same upstream
    let status = reqwest::Client::new()
        .get(&url)
        .query(&[("f", "actor"), ("q", "藤森里穂")])
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status.as_u16(), 403);

    let scraper = AliasScraper::with_search_url(url, Duration::from_secs(5)).unwrap();
    let aliases = scraper
        .search_alias("藤森里穂", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(aliases, vec!["藤森里穂", "井上遥香"]);
}

#[tokio::test]
async fn test_scraper_not_found_is_empty() {
    let scraper = upstream_scraper().await;
    let aliases = scraper
        .search_alias("nobody", &CancellationToken::new())
        .await
        .unwrap();
    assert!(aliases.is_empty());
}

#[tokio::test]
async fn test_scraper_non_200_is_upstream_status() {
    let router = Router::new().route("/search", get(|| async { StatusCode::NOT_FOUND }));
    let addr = helpers::spawn_upstream(router).await;
    let url = format!("http://{}/search", addr);
    let scraper = AliasScraper::with_search_url(url, Duration::from_secs(5)).unwrap();

    let err = scraper
        .search_alias("anyone", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::UpstreamStatus { status: 404, .. }), "{:?}", err);
}

#[tokio::test]
async fn test_scraper_honors_cancellation() {
    let router = Router::new().route(
        "/search",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Html(String::new())
        }),
    );
    let addr = helpers::spawn_upstream(router).await;
    let url = format!("http://{}/search", addr);
    let scraper = AliasScraper::with_search_url(url, Duration::from_secs(60)).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = scraper.search_alias("anyone", &cancel).await.unwrap_err();
    assert!(matches!(err, ToolError::Cancelled));
}

#[tokio::test]
async fn test_concurrent_merges_lose_no_updates() {
    let (_tmp, path) = helpers::alias_file_with(r#"{"ActorA": ["Alias1"]}"#);

    let mut join_set = JoinSet::new();
    for i in 0..20 {
        // Separate store handles for the same file share one writer lock
        let merger = AliasMerger::new(AliasStore::new(&path));
        join_set.spawn(async move {
            let alias = format!("Extra{}", i);
            merger
                .add_or_update_alias("Ignored", &["Alias1".to_string(), alias])
                .await
        });
    }

    while let Some(result) = join_set.join_next().await {
        assert_eq!(result.unwrap().unwrap(), "ActorA");
    }

    let document = helpers::read_json(&path);
    let aliases = document["ActorA"].as_array().unwrap();
    assert_eq!(aliases.len(), 21);
    assert_eq!(aliases[0], "Alias1");
    for i in 0..20 {
        assert!(aliases.contains(&json!(format!("Extra{}", i))), "Extra{} missing", i);
    }
    assert_eq!(document.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolver_sees_committed_merge() {
    let (_tmp, path) = helpers::alias_file_with("{}");
    let merger = AliasMerger::new(AliasStore::new(&path));
    let resolver = AliasResolver::new(AliasStore::new(&path));

    assert_eq!(resolver.resolve_directory("井上遥香").await.unwrap(), None);

    let dir = merger
        .add_or_update_alias("藤森里穂", &["藤森里穂".to_string(), "井上遥香".to_string()])
        .await
        .unwrap();
    assert_eq!(dir, "藤森里穂");
    assert_eq!(
        resolver.resolve_directory("井上遥香").await.unwrap(),
        Some("藤森里穂".to_string())
    );
}

#[tokio::test]
async fn test_ensure_exists_creates_empty_document() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("aliases.json");
    let store = AliasStore::new(&path);

    assert!(store.ensure_exists().await.unwrap());
    assert!(!store.ensure_exists().await.unwrap());
    assert_eq!(helpers::read_json(&path), json!({}));
}

#[tokio::test]
#[ignore = "requires network access to the live actor search page"]
async fn test_live_scrape() {
    let scraper = AliasScraper::new(Duration::from_secs(30)).unwrap();
    let aliases = scraper
        .search_alias("藤森里穂", &CancellationToken::new())
        .await
        .unwrap();
    assert!(aliases.iter().any(|a| a == "井上遥香"), "{:?}", aliases);
}
