//! End-to-end tests for the signed blog API.

use blogtraffic::auth::{now_millis, sign, REPLAY_WINDOW_MS, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use blogtraffic::config::BlogConfig;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

mod common;
use common::{SECRET, TOKEN};

async fn signed_at(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: &Value,
    timestamp: i64,
) -> reqwest::Response {
    let raw = serde_json::to_vec(body).unwrap();
    client
        .request(method, url)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {TOKEN}"))
        .header(SIGNATURE_HEADER, sign(SECRET.as_bytes(), &raw, timestamp))
        .header(TIMESTAMP_HEADER, timestamp.to_string())
        .body(raw)
        .send()
        .await
        .unwrap()
}

async fn signed(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: &Value,
) -> reqwest::Response {
    signed_at(client, method, url, body, now_millis()).await
}

fn sample(id: &str, slug: &str) -> Value {
    json!({
        "blogId": id,
        "title": "Ranking on page one",
        "content": "<p>Write good things.</p>",
        "slug": slug,
        "seoTitle": "Ranking",
        "keywords": [{"name": "seo", "volume": 900}, "ranking"]
    })
}

fn temp_store() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("blogtraffic-it-{}.json", uuid::Uuid::new_v4()))
}

fn config_with_store(path: &std::path::Path) -> BlogConfig {
    let mut config = common::test_config();
    config.store.path = Some(path.display().to_string());
    config
}

#[tokio::test]
async fn test_create_read_persist() {
    let path = temp_store();
    let server = common::spawn_server(config_with_store(&path)).await;
    let client = reqwest::Client::new();

    let res = signed(&client, Method::POST, &server.url("/api/blogs"), &sample("b1", "page-one")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["blog"]["keywords"], json!([
        {"name": "seo", "volume": 900},
        {"name": "ranking", "volume": 0}
    ]));
    assert_eq!(body["blog"]["thumbnail"], "");

    let res = client
        .get(server.url("/api/blogs?slug=page-one"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["blogId"], "b1");
    assert_eq!(fetched["seoTitle"], "Ranking");

    let on_disk: Vec<Value> =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0]["blogId"], "b1");

    drop(server);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_store_survives_restart() {
    let path = temp_store();
    {
        let server = common::spawn_server(config_with_store(&path)).await;
        let client = reqwest::Client::new();
        let res = signed(&client, Method::POST, &server.url("/api/blogs/add"), &sample("keep", "kept")).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let server = common::spawn_server(config_with_store(&path)).await;
    let res = reqwest::get(server.url("/api/blogs?blogId=keep")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    drop(server);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_duplicate_create_keeps_original() {
    let server = common::spawn_server(common::test_config()).await;
    let client = reqwest::Client::new();
    let url = server.url("/api/blogs");

    let first = signed(&client, Method::POST, &url, &sample("dup", "original")).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = signed(&client, Method::POST, &url, &sample("dup", "imposter")).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "Blog with this blogId already exists");

    let kept: Value = client
        .get(server.url("/api/blogs?blogId=dup"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(kept["slug"], "original");
}

#[tokio::test]
async fn test_auth_failures() {
    let server = common::spawn_server(common::test_config()).await;
    let client = reqwest::Client::new();
    let url = server.url("/api/blogs");

    // No headers at all.
    let res = client.post(&url).json(&sample("x", "x")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing auth headers");

    // Outside the replay window.
    let stale = now_millis() - REPLAY_WINDOW_MS - 60_000;
    let res = signed_at(&client, Method::POST, &url, &sample("x", "x"), stale).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Request expired");

    // Wrong token.
    let raw = serde_json::to_vec(&sample("x", "x")).unwrap();
    let ts = now_millis();
    let res = client
        .post(&url)
        .header("authorization", "Bearer not-the-token")
        .header(SIGNATURE_HEADER, sign(SECRET.as_bytes(), &raw, ts))
        .header(TIMESTAMP_HEADER, ts.to_string())
        .body(raw)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid API token");

    // Nothing was written.
    let all: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_whitespace_is_part_of_signature() {
    let server = common::spawn_server(common::test_config()).await;
    let client = reqwest::Client::new();
    let ts = now_millis();

    let compact = br#"{"blogId":"w","title":"t","content":"c","slug":"s"}"#;
    let spaced = br#"{ "blogId": "w", "title": "t", "content": "c", "slug": "s" }"#;

    let res = client
        .post(server.url("/api/blogs"))
        .header("authorization", format!("Bearer {TOKEN}"))
        .header(SIGNATURE_HEADER, sign(SECRET.as_bytes(), compact, ts))
        .header(TIMESTAMP_HEADER, ts.to_string())
        .body(spaced.to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url("/api/blogs"))
        .header("authorization", format!("Bearer {TOKEN}"))
        .header(SIGNATURE_HEADER, sign(SECRET.as_bytes(), spaced, ts))
        .header(TIMESTAMP_HEADER, ts.to_string())
        .body(spaced.to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_update_delete_and_listing_order() {
    let server = common::spawn_server(common::test_config()).await;
    let client = reqwest::Client::new();
    let url = server.url("/api/blogs");

    for (id, slug) in [("first", "a"), ("second", "b")] {
        let res = signed(&client, Method::POST, &url, &sample(id, slug)).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let all: Vec<Value> = reqwest::get(&url).await.unwrap().json().await.unwrap();
    let ids: Vec<&str> = all.iter().filter_map(|b| b["blogId"].as_str()).collect();
    assert_eq!(ids, vec!["second", "first"]);

    let res = signed(
        &client,
        Method::PATCH,
        &url,
        &json!({"blogId": "first", "title": "Renamed", "keywords": "fresh"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Blog updated successfully");
    assert_eq!(body["blog"]["title"], "Renamed");
    assert_eq!(body["blog"]["keywords"], json!([{"name": "fresh", "volume": 0}]));

    let res = signed(&client, Method::PATCH, &url, &json!({"blogId": "ghost", "title": "x"})).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = signed(&client, Method::PATCH, &url, &json!({"blogId": "first", "title": ""})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = signed(
        &client,
        Method::DELETE,
        &server.url("/api/blogs/delete"),
        &json!({"blogId": "first"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = reqwest::get(server.url("/api/blogs?blogId=first")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preflight_and_cors_headers() {
    let server = common::spawn_server(common::test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .request(Method::OPTIONS, server.url("/api/blogs/add"))
        .header("origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(
        res.headers()["access-control-allow-methods"],
        "GET, POST, PATCH, DELETE, OPTIONS"
    );

    let res = client
        .get(server.url("/api/blogs?blogId=missing"))
        .header("origin", "https://elsewhere.example")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://blogtraffic.vercel.app"
    );
    assert!(res.headers().contains_key("x-request-id"));
}
