#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use djumblelog_api::config::{JournalConfig, ServerConfig};
use djumblelog_api::routes;
use djumblelog_api::state::{build_registry, AppState};
use djumblelog_core::content_type::ContentType;
use djumblelog_core::source::SourceRef;
use djumblelog_core::types::DbId;
use djumblelog_events::{connect_journal, Signals, TrackingConfig};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Journal configuration tracking `blog.post` and `links.link` creation,
/// and `blog.post` deletion only.
pub fn test_journal_config() -> JournalConfig {
    JournalConfig {
        tracking: TrackingConfig {
            models: Some(vec!["blog.post".to_string(), "links.link".to_string()]),
            models_delete: Some(vec!["blog.post".to_string()]),
        },
        template_dirs: Vec::new(),
        site_domain: "example.com".to_string(),
    }
}

/// Create the host tables backing `blog.post` and `links.link`.
pub async fn create_source_tables(pool: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE blog_post (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            url TEXT
        )",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "CREATE TABLE links_link (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            url TEXT
        )",
    )
    .execute(pool)
    .await
    .unwrap();
}

/// Build state the way `main.rs` does, with the given journal config.
pub async fn build_state(pool: SqlitePool, journal_config: JournalConfig) -> AppState {
    create_source_tables(&pool).await;

    let registry = build_registry(&pool, &journal_config.tracking.all_identifiers())
        .await
        .unwrap();
    let mut signals = Signals::new();
    connect_journal(&mut signals, &registry, &journal_config.tracking).unwrap();

    AppState::new(pool, test_config(), journal_config, registry, signals)
}

pub async fn test_state(pool: SqlitePool) -> AppState {
    build_state(pool, test_journal_config()).await
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .merge(routes::site_routes())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Host write path
// ---------------------------------------------------------------------------

fn source(identifier: &str, id: DbId) -> SourceRef {
    SourceRef::new(ContentType::parse(identifier).unwrap(), id)
}

/// Insert a post and dispatch `post_save` in the same transaction.
pub async fn create_post(state: &AppState, title: &str, url: Option<&str>) -> DbId {
    let mut tx = state.pool.begin().await.unwrap();
    let id: DbId = sqlx::query_scalar("INSERT INTO blog_post (title, url) VALUES ($1, $2) RETURNING id")
        .bind(title)
        .bind(url)
        .fetch_one(&mut *tx)
        .await
        .unwrap();
    state
        .signals
        .post_save(&mut tx, &source("blog.post", id), true)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    id
}

/// Update a post's title and dispatch `post_save` with `created = false`.
pub async fn update_post(state: &AppState, id: DbId, title: &str) {
    let mut tx = state.pool.begin().await.unwrap();
    sqlx::query("UPDATE blog_post SET title = $1 WHERE id = $2")
        .bind(title)
        .bind(id)
        .execute(&mut *tx)
        .await
        .unwrap();
    state
        .signals
        .post_save(&mut tx, &source("blog.post", id), false)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

/// Dispatch `pre_delete` and delete the post in one transaction.
pub async fn delete_post(state: &AppState, id: DbId) {
    let mut tx = state.pool.begin().await.unwrap();
    state
        .signals
        .pre_delete(&mut tx, &source("blog.post", id))
        .await
        .unwrap();
    sqlx::query("DELETE FROM blog_post WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

/// Insert a link and dispatch `post_save` in the same transaction.
pub async fn create_link(state: &AppState, name: &str) -> DbId {
    let mut tx = state.pool.begin().await.unwrap();
    let id: DbId = sqlx::query_scalar("INSERT INTO links_link (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .unwrap();
    state
        .signals
        .post_save(&mut tx, &source("links.link", id), true)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    id
}

/// Delete a link, dispatching `pre_delete` first.
pub async fn delete_link(state: &AppState, id: DbId) {
    let mut tx = state.pool.begin().await.unwrap();
    state
        .signals
        .pre_delete(&mut tx, &source("links.link", id))
        .await
        .unwrap();
    sqlx::query("DELETE FROM links_link WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
