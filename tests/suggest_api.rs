//! End-to-end tests for `GET /api/domain` against mock upstreams.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use blogtraffic::config::{BlogConfig, ProviderConfig};
use blogtraffic::suggest::ProviderKind;
use serde_json::{json, Value};

mod common;
use common::Reply;

fn with_upstreams(bing: String, ddg: String, yahoo: String) -> BlogConfig {
    let mut config = common::test_config();
    config.suggest.providers = vec![
        ProviderConfig::with_endpoint(ProviderKind::Bing, bing),
        ProviderConfig::with_endpoint(ProviderKind::DuckDuckGo, ddg),
        ProviderConfig::with_endpoint(ProviderKind::Yahoo, yahoo),
    ];
    config.suggest.timeout_ms = 300;
    config.suggest.retry_backoff_ms = 50;
    config
}

async fn get_json(url: &str) -> (u16, Value) {
    let res = reqwest::get(url).await.unwrap();
    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn test_merges_all_providers_in_priority_order() {
    let bing = common::start_mock_backend(r#"["seo", ["seo tools", "seo audit"]]"#).await;
    let ddg = common::start_mock_backend(r#"["seo", ["seo audit", "seo meaning"]]"#).await;
    let yahoo = common::start_programmable_backend(|target| async move {
        // Region segment comes from the country parameter.
        if target.starts_with("/sugg/gossip-de-ura/") {
            Reply::Respond(200, r#"{"r":[{"k":"seo tools"},{"k":"seo agentur"}]}"#.into())
        } else {
            Reply::Respond(404, "{}".into())
        }
    })
    .await;

    let server = common::spawn_server(with_upstreams(
        format!("http://{bing}/osjson.aspx"),
        format!("http://{ddg}/ac/"),
        format!("http://{yahoo}/sugg/"),
    ))
    .await;

    let (status, body) = get_json(&server.url("/api/domain?keyword=seo&country=DE&market=de-DE")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "success": true,
            "query": "seo",
            "sources": ["bing", "duckduckgo", "yahoo"],
            "keywords": ["seo tools", "seo audit", "seo meaning", "seo agentur"]
        })
    );
}

#[tokio::test]
async fn test_failed_and_slow_providers_degrade_to_empty() {
    let broken = common::start_programmable_backend(|_| async {
        Reply::Respond(500, "oops".into())
    })
    .await;
    let slow = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Reply::Respond(200, r#"["kw", ["too late"]]"#.into())
    })
    .await;
    let garbage = common::start_mock_backend("<html>not json</html>").await;

    let server = common::spawn_server(with_upstreams(
        format!("http://{broken}/"),
        format!("http://{slow}/"),
        format!("http://{garbage}/"),
    ))
    .await;

    let started = Instant::now();
    let (status, body) = get_json(&server.url("/api/domain?keyword=kw")).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["keywords"], json!([]));
    // Two 300ms attempts plus a 50ms pause, not five seconds.
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_dropped_connection_is_retried_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let flaky = common::start_programmable_backend(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                Reply::Drop
            } else {
                Reply::Respond(200, r#"["kw", ["second try"]]"#.into())
            }
        }
    })
    .await;
    let empty = common::start_mock_backend(r#"["kw", []]"#).await;
    let yahoo_empty = common::start_mock_backend(r#"{"r": []}"#).await;

    let server = common::spawn_server(with_upstreams(
        format!("http://{flaky}/"),
        format!("http://{empty}/"),
        format!("http://{yahoo_empty}/"),
    ))
    .await;

    let (status, body) = get_json(&server.url("/api/domain?keyword=kw")).await;
    assert_eq!(status, 200);
    assert_eq!(body["keywords"], json!(["second try"]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_short_keyword_never_reaches_upstream() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let upstream = common::start_programmable_backend(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Reply::Respond(200, r#"["a", ["ab"]]"#.into()) }
    })
    .await;
    let url = format!("http://{upstream}/");

    let server = common::spawn_server(with_upstreams(url.clone(), url.clone(), url)).await;

    let (status, body) = get_json(&server.url("/api/domain?keyword=a")).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Keyword must be at least 2 characters long");

    let (status, body) = get_json(&server.url("/api/domain?keyword=")).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Keyword parameter is required");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
