//! E2E tests against the stub server.
//!
//! These exercise real HTTP round-trips through a `reqwest` client.

#![cfg(feature = "server")]

use std::time::Duration;

use mockingjay::builders::{self, failure, json, redirect, text};
use mockingjay::matchers::{self, everything, uri};
use mockingjay::server::FAILURE_HEADER;
use mockingjay::{Download, StubFailure, StubFile, StubServer, Stubs};

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = StubServer::start(Stubs::new()).await.unwrap();
    let server2 = StubServer::start(Stubs::new()).await.unwrap();

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = StubServer::start(Stubs::new()).await.unwrap();
    let url = server.url_for("/anything");

    server.shutdown().await;

    let result = reqwest::Client::new().get(url).send().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_server_from_bound_listener() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let stubs = Stubs::new();
    stubs.stub(everything(), text("bound", encoding_rs::UTF_8));

    let server = StubServer::from_listener(listener, stubs).await.unwrap();
    assert_eq!(server.address(), address);

    let body = reqwest::get(server.url_for("/")).await.unwrap().text().await.unwrap();
    assert_eq!(body, "bound");

    server.shutdown().await;
}

// =============================================================================
// Answering Tests
// =============================================================================

#[tokio::test]
async fn test_direct_request_is_stubbed() {
    let stubs = Stubs::new();
    stubs.stub(uri("/users/{id}").unwrap(), json(&serde_json::json!({"id": 1})));
    let server = StubServer::start(stubs).await.unwrap();

    let response = reqwest::get(server.url_for("/users/1")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "application/json; charset=utf-8"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_proxied_request_keeps_its_host() {
    let stubs = Stubs::new();
    stubs.stub(
        uri("http://api.example.com/greeting").unwrap(),
        text("Hello World", encoding_rs::UTF_8),
    );
    let server = StubServer::start(stubs).await.unwrap();
    let client = server.client().unwrap();

    let response = client
        .get("http://api.example.com/greeting")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "Hello World");

    server.shutdown().await;
}

#[tokio::test]
async fn test_unmatched_request_is_not_found() {
    let server = StubServer::start(Stubs::new()).await.unwrap();

    let response = reqwest::get(server.url_for("/missing")).await.unwrap();

    assert_eq!(response.status(), 404);
    let body = response.text().await.unwrap();
    assert!(body.contains("GET"), "{body}");
    assert!(body.contains("/missing"), "{body}");

    server.shutdown().await;
}

#[tokio::test]
async fn test_failure_is_bad_gateway() {
    let stubs = Stubs::new();
    stubs.stub(
        everything(),
        failure(StubFailure::new("network", -1009).with_message("offline")),
    );
    let server = StubServer::start(stubs).await.unwrap();

    let response = reqwest::get(server.url_for("/")).await.unwrap();

    assert_eq!(response.status(), 502);
    assert_eq!(response.headers()[FAILURE_HEADER], "network:-1009");
    assert_eq!(response.text().await.unwrap(), "network error -1009: offline");

    server.shutdown().await;
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let stubs = Stubs::new();
    stubs.stub(uri("/old").unwrap(), redirect("/new"));
    stubs.stub(uri("/new").unwrap(), json(&["moved"]));
    let server = StubServer::start(stubs).await.unwrap();

    let response = reqwest::get(server.url_for("/old")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.url().path(), "/new");
    assert_eq!(response.text().await.unwrap(), r#"["moved"]"#);

    server.shutdown().await;
}

#[tokio::test]
async fn test_streamed_body_is_complete() {
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let stubs = Stubs::new();
    stubs.stub(
        uri("/download").unwrap(),
        builders::http(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            Download::stream_content(data.clone(), 1024),
        ),
    );
    let server = StubServer::start(stubs).await.unwrap();

    let bytes = reqwest::get(server.url_for("/download"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();

    assert_eq!(bytes.as_ref(), data.as_slice());

    server.shutdown().await;
}

#[tokio::test]
async fn test_stubs_added_after_start_apply() {
    let server = StubServer::start(Stubs::new()).await.unwrap();
    server.stubs().stub(
        matchers::http(http::Method::DELETE, "/items/{id}").unwrap(),
        builders::http(http::StatusCode::NO_CONTENT, http::HeaderMap::new(), Download::NoContent),
    );

    let response = reqwest::Client::new()
        .delete(server.url_for("/items/3"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 204);

    server.shutdown().await;
}

#[tokio::test]
async fn test_delayed_stub() {
    let stubs = Stubs::new();
    stubs.stub_with_delay(everything(), json(&["late"]), Duration::from_millis(100));
    let server = StubServer::start(stubs).await.unwrap();

    let started = std::time::Instant::now();
    let response = reqwest::get(server.url_for("/")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(started.elapsed() >= Duration::from_millis(100));

    server.shutdown().await;
}

// =============================================================================
// Stub File Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_serve_stub_file() {
    let file = StubFile::from_json(
        r#"{ "stubs": [
            { "method": "GET", "uri": "/health",
              "response": { "type": "text", "body": "ok" } },
            { "response": { "type": "http", "status": 418 } }
        ] }"#,
    )
    .unwrap();

    let stubs = Stubs::new();
    file.register(&stubs).unwrap();
    let server = StubServer::start(stubs).await.unwrap();

    let response = reqwest::get(server.url_for("/health")).await.unwrap();
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = reqwest::get(server.url_for("/tea")).await.unwrap();
    assert_eq!(response.status(), 418);

    server.shutdown().await;
}
