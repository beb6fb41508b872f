//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_reports_journal_wiring(pool: SqlitePool) {
    let state = common::test_state(pool).await;
    common::create_post(&state, "Hello", None).await;
    common::create_link(&state, "A link").await;
    let app = common::build_test_app(state);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["journal"]["content_types"], 2);
    assert_eq!(
        json["journal"]["tracked_create"],
        serde_json::json!(["blog.post", "links.link"])
    );
    assert_eq!(json["journal"]["tracked_delete"], serde_json::json!(["blog.post"]));
    assert_eq!(json["journal"]["entries"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(common::test_state(pool).await);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn response_contains_x_request_id_header(pool: SqlitePool) {
    let app = common::build_test_app(common::test_state(pool).await);
    let response = get(app, "/health").await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );
    assert_eq!(request_id.unwrap().to_str().unwrap().len(), 36);
}
