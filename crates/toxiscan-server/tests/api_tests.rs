//! Integration tests for the Toxiscan HTTP API
//!
//! Each test runs the keyword mock as the prediction service on a local
//! port and drives the router in-process.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use toxiscan_server::config::{AppConfig, ConfigOverrides};
use toxiscan_server::mock::{serve_mock_model, ResponseShape};
use toxiscan_server::server::{build_app, build_orchestrator};
use toxiscan_server::AppState;

async fn start_mock_model(shape: ResponseShape) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_mock_model(listener, shape));
    format!("http://{}/predict", addr)
}

fn app_for(upstream: String) -> Router {
    let mut config = AppConfig::default();
    config.apply(&ConfigOverrides {
        upstream: Some(upstream),
        ephemeral: true,
        ..Default::default()
    });

    let state = AppState::new(build_orchestrator(&config).unwrap());
    build_app(state, &config.server)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn classify_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/classify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_for("http://127.0.0.1:9/predict".to_string());
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_classify_toxic_comment() {
    let app = app_for(start_mock_model(ResponseShape::Prediction).await);

    let (status, body) = send(
        &app,
        classify_request(json!({ "comment": "  I hate you, you stupid idiot!  " })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "TOXIC");
    assert_eq!(body["comment"], "I hate you, you stupid idiot!");
    assert!(body["id"].as_str().unwrap().starts_with("cls_"));
    assert!(body["confidence"].as_f64().unwrap() > 0.5);
}

#[tokio::test]
async fn test_classify_with_flag_shape() {
    let app = app_for(start_mock_model(ResponseShape::IsToxic).await);

    let (status, body) = send(
        &app,
        classify_request(json!({ "comment": "What a thoughtful reply" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "NON-TOXIC");
    assert_eq!(body["confidence"], 1.0);
}

#[tokio::test]
async fn test_validation_errors_are_bad_requests() {
    let app = app_for(start_mock_model(ResponseShape::Prediction).await);

    let (status, body) = send(&app, classify_request(json!({ "comment": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "EMPTY_COMMENT");
    assert_eq!(
        body["error"]["message"],
        "Failed to classify comment. Please try again."
    );

    let (status, body) = send(&app, classify_request(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "EMPTY_COMMENT");

    let (status, body) = send(
        &app,
        classify_request(json!({ "comment": "a".repeat(513) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "TOO_LONG");

    let (_, history) = send(&app, get("/api/history")).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_unreadable_request_bodies_get_generic_error() {
    let app = app_for(start_mock_model(ResponseShape::Prediction).await);

    let wrong_type = classify_request(json!({ "comment": 42 }));
    let not_json = Request::builder()
        .method("POST")
        .uri("/api/classify")
        .header("content-type", "application/json")
        .body(Body::from("{comment"))
        .unwrap();
    let no_content_type = Request::builder()
        .method("POST")
        .uri("/api/classify")
        .body(Body::from(r#"{"comment":"hello"}"#))
        .unwrap();

    for request in [wrong_type, not_json, no_content_type] {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "INVALID_REQUEST");
        assert_eq!(
            body["error"]["message"],
            "Failed to classify comment. Please try again."
        );
    }

    let (_, history) = send(&app, get("/api/history")).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_unreachable_upstream_is_service_unavailable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let app = app_for(format!("http://127.0.0.1:{}/predict", port));

    let (status, body) = send(&app, classify_request(json!({ "comment": "hello" }))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["kind"], "UPSTREAM_UNAVAILABLE");

    let (_, history) = send(&app, get("/api/history")).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_history_lists_newest_first_and_clears() {
    let app = app_for(start_mock_model(ResponseShape::Prediction).await);

    for comment in ["first comment", "second comment", "third comment"] {
        let (status, _) = send(&app, classify_request(json!({ "comment": comment }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, history) = send(&app, get("/api/history")).await;
    assert_eq!(status, StatusCode::OK);
    let comments: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["comment"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(comments, vec!["third comment", "second comment", "first comment"]);

    let (_, limited) = send(&app, get("/api/history?limit=1")).await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
    assert_eq!(limited[0]["comment"], "third comment");

    let clear = Request::builder()
        .method("DELETE")
        .uri("/api/history")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, clear).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cleared");

    let (_, history) = send(&app, get("/api/history")).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_status_reports_idle_and_counters() {
    let app = app_for(start_mock_model(ResponseShape::Prediction).await);

    send(&app, classify_request(json!({ "comment": "you are awful" }))).await;
    send(&app, classify_request(json!({ "comment": "" }))).await;

    let (status, body) = send(&app, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");
    assert_eq!(body["history_len"], 1);
    assert_eq!(body["metrics"]["submissions"], 2);
    assert_eq!(body["metrics"]["succeeded"], 1);
    assert_eq!(body["metrics"]["rejected"], 1);
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let app = app_for("http://127.0.0.1:9/predict".to_string());
    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
