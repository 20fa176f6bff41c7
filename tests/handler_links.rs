mod common;

use axum::{
    Router,
    routing::{get, post},
};
use axum_test::TestServer;
use link_shortener::api::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
};
use serde_json::json;

#[tokio::test]
async fn test_create_link_generates_code() {
    let (state, _rx, _repo) = common::create_test_state();
    let app = Router::new()
        .route("/api/links", post(create_link_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/some/long/path" }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);

    let body = response.json::<serde_json::Value>();
    let code = body["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(body["url"], "https://example.com/some/long/path");
}

#[tokio::test]
async fn test_create_link_with_custom_code() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com", "code": "promo1" }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.assert_json(&json!({ "code": "promo1", "url": "https://example.com" }));
}

#[tokio::test]
async fn test_create_link_null_code_is_generated() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com", "code": null }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    assert_eq!(response.json::<serde_json::Value>()["code"].as_str().unwrap().len(), 6);
}

#[tokio::test]
async fn test_create_link_invalid_url() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "not-a-url" }))
        .await;

    response.assert_status_bad_request();

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "Invalid URL format");
    assert_eq!(body["error"]["details"]["field"], "url");
}

#[tokio::test]
async fn test_create_link_rejects_non_http_scheme() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "javascript:alert(1)" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_create_link_invalid_code() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    for code in ["ab", "abc-12", "toolongcode", "healthz"] {
        let response = server
            .post("/api/links")
            .json(&json!({ "url": "https://example.com", "code": code }))
            .await;

        response.assert_status_bad_request();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["details"]["field"], "code", "code: {code}");
    }
}

#[tokio::test]
async fn test_create_link_malformed_json() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/links")
        .text("{ not json")
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_create_link_missing_url_field() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/api/links")
        .json(&json!({ "code": "abc123" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_create_link_duplicate_code_conflicts() {
    let (state, _rx, repo) = common::create_test_state();
    common::create_test_link(&repo, "taken1", "https://first.example").await;
    let server = common::test_server(state);

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "https://second.example", "code": "taken1" }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "conflict");
    assert!(body["error"]["message"].as_str().unwrap().contains("taken1"));

    // The original mapping is untouched
    let response = server.get("/api/links/taken1").await;
    assert_eq!(
        response.json::<serde_json::Value>()["url"],
        "https://first.example"
    );
}

#[tokio::test]
async fn test_same_url_twice_gets_two_codes() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let first = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .json::<serde_json::Value>();
    let second = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .json::<serde_json::Value>();

    assert_ne!(first["code"], second["code"]);
}

#[tokio::test]
async fn test_list_links_empty() {
    let (state, _rx, _repo) = common::create_test_state();
    let app = Router::new()
        .route("/api/links", get(list_links_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/links").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "links": [] }));
}

#[tokio::test]
async fn test_list_links_newest_first() {
    let (state, _rx, repo) = common::create_test_state();

    for code in ["older1", "middle", "newer1"] {
        common::create_test_link(&repo, code, "https://example.com").await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let server = common::test_server(state);

    let response = server.get("/api/links").await;

    response.assert_status_ok();

    let body = response.json::<serde_json::Value>();
    let codes: Vec<&str> = body["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["code"].as_str().unwrap())
        .collect();

    assert_eq!(codes, vec!["newer1", "middle", "older1"]);
    assert_eq!(body["links"][0]["clicks"], 0);
    assert!(body["links"][0]["last_clicked_at"].is_null());
}

#[tokio::test]
async fn test_get_link() {
    let (state, _rx, repo) = common::create_test_state();
    common::create_test_link(&repo, "abc123", "https://example.com/page").await;

    let app = Router::new()
        .route("/api/links/{code}", get(get_link_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/links/abc123").await;

    response.assert_status_ok();

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], "abc123");
    assert_eq!(body["url"], "https://example.com/page");
    assert_eq!(body["clicks"], 0);
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn test_get_link_not_found() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    for code in ["doesnotexist", "abc123"] {
        let response = server.get(&format!("/api/links/{code}")).await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<serde_json::Value>()["error"]["code"],
            "not_found"
        );
    }
}

#[tokio::test]
async fn test_delete_link() {
    let (state, _rx, repo) = common::create_test_state();
    common::create_test_link(&repo, "bye123", "https://example.com").await;

    let app = Router::new()
        .route(
            "/api/links/{code}",
            get(get_link_handler).delete(delete_link_handler),
        )
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.delete("/api/links/bye123").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "message": "Link deleted successfully", "code": "bye123" }));

    server.get("/api/links/bye123").await.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_link_not_found() {
    let (state, _rx, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server.delete("/api/links/nope12").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_deleted_code_can_be_reused() {
    let (state, _rx, repo) = common::create_test_state();
    common::create_test_link(&repo, "reuse1", "https://old.example").await;
    let server = common::test_server(state);

    server.delete("/api/links/reuse1").await.assert_status_ok();

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "https://new.example", "code": "reuse1" }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
}
