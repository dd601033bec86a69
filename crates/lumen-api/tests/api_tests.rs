//! API Integration Tests
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lumen_api::{create_router, create_router_for_testing, state::AppState};
use lumen_core::AppConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn repeating(len: usize) -> String {
    "Shipping notices are sent before every delivery window closes. "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

const SHORT: &str = "Refunds are issued within fourteen days.";

async fn seeded_app() -> Router {
    let app = create_router_for_testing();

    for (id, filename, content) in [
        ("doc-a", "shipping.txt", repeating(1200)),
        ("doc-b", "refunds.md", SHORT.to_string()),
    ] {
        let (status, _) = send(
            &app,
            create_json_request(
                "POST",
                "/api/v1/documents",
                Some(json!({"id": id, "filename": filename, "content": content})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    app
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, create_json_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_before_and_after_initialization() {
    let state = Arc::new(AppState::new(AppConfig::default()));
    let app = create_router(state.clone());

    let (status, json) = send(&app, create_json_request("GET", "/ready", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["ready"], false);

    assert!(state.initialize().await);

    let (status, json) = send(&app, create_json_request("GET", "/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["checks"]["vector_store"], true);
}

#[tokio::test]
async fn test_metrics_report_store_counts() {
    let app = seeded_app().await;

    let (status, json) = send(&app, create_json_request("GET", "/metrics", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["documents"], 2);
    // 1200 chars give three chunks
    assert_eq!(json["chunks"], 3);
    assert_eq!(json["vectors"], 5);
    assert!(json["total_requests"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request("GET", "/api-docs/openapi.json", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/v1/query"].is_object());
    assert!(json["paths"]["/api/v1/documents/{id}"].is_object());
}

// =============================================================================
// Document Tests
// =============================================================================

#[tokio::test]
async fn test_upload_document() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/documents",
            Some(json!({"filename": "guide.md", "content": repeating(1000)})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["file_type"], "Text");
    assert_eq!(json["vectorized"], true);
    assert_eq!(json["chunk_count"], 3);
    assert_eq!(json["pages"], 1);
    assert_eq!(json["id"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_upload_binary_without_content() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/documents",
            Some(json!({"filename": "scan.PDF", "pages": 4})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["file_type"], "PDF");
    assert_eq!(json["vectorized"], false);
    assert_eq!(json["chunk_count"], 0);
    assert_eq!(json["pages"], 4);
}

#[tokio::test]
async fn test_upload_empty_filename() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/documents",
            Some(json!({"filename": "", "content": "text"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_list_get_and_delete_document() {
    let app = seeded_app().await;

    let (status, json) = send(&app, create_json_request("GET", "/api/v1/documents", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["documents"][0]["id"], "doc-a");

    let (status, json) = send(
        &app,
        create_json_request("GET", "/api/v1/documents?file_type=text&page_size=1", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["documents"].as_array().unwrap().len(), 1);

    let (status, json) = send(&app, create_json_request("GET", "/api/v1/documents/doc-a", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "shipping.txt");
    assert_eq!(json["chunk_count"], 3);

    let (status, _) = send(
        &app,
        create_json_request("DELETE", "/api/v1/documents/doc-a", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, create_json_request("GET", "/api/v1/documents/doc-a", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let (status, _) = send(
        &app,
        create_json_request("DELETE", "/api/v1/documents/doc-a", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_documents_far_past_last_page() {
    let app = seeded_app().await;

    let (status, json) = send(
        &app,
        create_json_request("GET", "/api/v1/documents?page=4294967295&page_size=100", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["page"], 4294967295u64);
    assert!(json["documents"].as_array().unwrap().is_empty());
}

// =============================================================================
// Search and Query Tests
// =============================================================================

#[tokio::test]
async fn test_search_returns_chunk_hit() {
    let app = seeded_app().await;
    let prefix: String = repeating(1200).chars().take(500).collect();

    let (status, json) = send(
        &app,
        create_json_request("POST", "/api/v1/search", Some(json!({"query": prefix}))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"][0]["id"], "doc-a_chunk_0");
    assert_eq!(json["results"][0]["chunk_index"], 0);
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn test_query_answers_with_citation() {
    let app = seeded_app().await;

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/query",
            Some(json!({"question": SHORT, "top_k": 1})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "answered");
    assert_eq!(json["query"], SHORT);

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["document_id"], "doc-b");
    assert_eq!(results[0]["answer"], SHORT);
    assert_eq!(results[0]["citation"], "Page 1, Paragraph 1");
    assert!((results[0]["score"].as_f64().unwrap() - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_query_without_documents() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request("POST", "/api/v1/query", Some(json!({"question": "anything"}))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "no_results");
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_query_validation() {
    let app = create_router_for_testing();

    for body in [
        json!({"question": "   "}),
        json!({"question": "valid", "top_k": 0}),
        json!({"question": "valid", "top_k": -1}),
        json!({"question": "valid", "top_k": 500}),
    ] {
        let (status, json) = send(
            &app,
            create_json_request("POST", "/api/v1/query", Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "BAD_REQUEST");
    }
}
