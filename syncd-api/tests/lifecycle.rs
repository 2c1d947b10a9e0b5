//! End-to-end lifecycle coverage against the assembled router, using the
//! in-memory reference `Controller`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use syncd_api::{ApiState, InMemoryController};

fn router() -> axum::Router {
    syncd_api::routes::build(ApiState::new(Arc::new(InMemoryController::new())))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_body(name: &str) -> String {
    json!({
        "task": {
            "name": name,
            "module": "example/module",
            "condition": {"services": {"names": ["api"]}}
        }
    })
    .to_string()
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let app = router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks")
                .header("content-type", "application/json")
                .body(Body::from(create_body("web_app")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/tasks/web_app")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["task"]["name"], "web_app");
}

#[tokio::test]
async fn duplicate_create_is_bad_request() {
    let app = router();
    let request = || {
        Request::builder()
            .method("POST")
            .uri("/v1/tasks")
            .header("content-type", "application/json")
            .body(Body::from(create_body("dup_task")))
            .unwrap()
    };

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_json(second).await;
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn create_with_inspect_does_not_persist() {
    let app = router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks?run=inspect")
                .header("content-type", "application/json")
                .body(Body::from(create_body("dry_run_task")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["run"]["plan"].as_str().unwrap().len() > 0);

    let followup = app
        .oneshot(
            Request::builder()
                .uri("/v1/tasks/dry_run_task")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(followup.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_requires_enabled_and_rejects_other_fields() {
    let app = router();
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks")
                .header("content-type", "application/json")
                .body(Body::from(create_body("toggle_task")))
                .unwrap(),
        )
        .await
        .unwrap();

    let missing_enabled = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/v1/tasks/toggle_task")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing_enabled.status(), StatusCode::BAD_REQUEST);

    let extra_field = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/v1/tasks/toggle_task")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"enabled": false, "module": "sneaky"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(extra_field.status(), StatusCode::BAD_REQUEST);

    let ok = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/v1/tasks/toggle_task")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"enabled": false}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let json = body_json(ok).await;
    assert_eq!(json["task"]["enabled"], false);
    assert!(json.get("run").is_none());
}

#[tokio::test]
async fn update_with_inspect_reports_run_but_does_not_persist() {
    let app = router();
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks")
                .header("content-type", "application/json")
                .body(Body::from(create_body("inspect_toggle_task")))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/v1/tasks/inspect_toggle_task?run=inspect")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"enabled": false}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json.get("run").is_some());

    let followup = app
        .oneshot(
            Request::builder()
                .uri("/v1/tasks/inspect_toggle_task")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(followup).await;
    assert_eq!(json["task"]["enabled"], true);
}

#[tokio::test]
async fn method_not_allowed_allow_header_is_scoped_per_route() {
    let app = router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/v1/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = response
        .headers()
        .get(axum::http::header::ALLOW)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(allow.contains("GET"));
    assert!(allow.contains("POST"));
    assert!(!allow.contains("PUT"));
    assert!(!allow.contains("PATCH"));
    assert!(!allow.contains("DELETE"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = response
        .headers()
        .get(axum::http::header::ALLOW)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(allow, "GET");
}

#[tokio::test]
async fn delete_removes_task() {
    let app = router();
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks")
                .header("content-type", "application/json")
                .body(Body::from(create_body("gone_task")))
                .unwrap(),
        )
        .await
        .unwrap();

    let deleted = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/v1/tasks/gone_task")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let missing = app
        .oneshot(
            Request::builder()
                .uri("/v1/tasks/gone_task")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_query_key_is_rejected() {
    let app = router();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks?run=now&run=inspect")
                .header("content-type", "application/json")
                .body(Body::from(create_body("bad_query_task")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn schema_violation_is_rejected() {
    let app = router();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"task": {"name": "x"}}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_endpoints_reflect_event_history() {
    let app = router();
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks?run=now")
                .header("content-type", "application/json")
                .body(Body::from(create_body("status_task")))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/status/tasks/status_task")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status_task"]["status"], "successful");

    let overall = app
        .oneshot(
            Request::builder()
                .uri("/v1/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(overall.status(), StatusCode::OK);
    let json = body_json(overall).await;
    assert_eq!(json["task_summary"]["status"]["successful"], 1);
}

#[tokio::test]
async fn error_response_request_id_matches_header() {
    let app = router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/tasks/does_not_exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let header_id = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let json = body_json(response).await;
    assert_eq!(json["request_id"].as_str().unwrap(), header_id);
}

#[tokio::test]
async fn health_endpoint_reports_healthy_before_first_background_check() {
    let app = router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
