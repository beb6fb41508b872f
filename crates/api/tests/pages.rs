//! Integration tests for the paginated list views (HTML and JSON).

mod common;

use axum::http::StatusCode;
use common::{body_json, body_text, get};
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// JSON list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_journal_has_valid_first_page(pool: SqlitePool) {
    let app = common::build_test_app(common::test_state(pool).await);

    let response = get(app.clone(), "/api/v1/entries").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["pages"], 1);
    assert_eq!(json["pagination"]["hits"], 0);

    let response = get(app, "/api/v1/entries?page=2").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn entries_are_paged_newest_first(pool: SqlitePool) {
    let state = common::test_state(pool).await;
    for n in 1..=5 {
        common::create_post(&state, &format!("Post {n}"), None).await;
    }
    let app = common::build_test_app(state);

    let json = body_json(get(app.clone(), "/api/v1/entries?page=2&page_size=2").await).await;
    let titles: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Post 3", "Post 2"]);

    let meta = &json["pagination"];
    assert_eq!(meta["pages"], 3);
    assert_eq!(meta["hits"], 5);
    assert_eq!(meta["has_next"], true);
    assert_eq!(meta["has_previous"], true);
    assert_eq!(meta["first_on_page"], 3);
    assert_eq!(meta["last_on_page"], 4);

    let json = body_json(get(app, "/api/v1/entries").await).await;
    let dates: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["created_at"].as_str().unwrap().to_string())
        .collect();
    let parsed: Vec<chrono::DateTime<chrono::Utc>> =
        dates.iter().map(|d| d.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] >= w[1]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn type_filter_accepts_model_name_and_identifier(pool: SqlitePool) {
    let state = common::test_state(pool).await;
    common::create_post(&state, "A post", None).await;
    common::create_link(&state, "A link").await;
    common::create_link(&state, "Another link").await;
    let app = common::build_test_app(state);

    let json = body_json(get(app.clone(), "/api/v1/entries?type=link").await).await;
    assert_eq!(json["pagination"]["hits"], 2);
    assert!(json["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["source_type"] == "links.link"));

    let json = body_json(get(app.clone(), "/api/v1/entries?type=blog.post").await).await;
    assert_eq!(json["pagination"]["hits"], 1);
    assert_eq!(json["data"][0]["rendered_by"], "default");

    let response = get(app, "/api/v1/entries?type=photos.photo").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["hits"], 0);
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn latest_entry_overall_and_per_type(pool: SqlitePool) {
    let state = common::test_state(pool).await;
    common::create_post(&state, "Older post", None).await;
    common::create_link(&state, "Newest link").await;
    let app = common::build_test_app(state);

    let json = body_json(get(app.clone(), "/api/v1/entries/latest").await).await;
    assert_eq!(json["data"]["title"], "Newest link");

    let json = body_json(get(app.clone(), "/api/v1/entries/latest?type=post").await).await;
    assert_eq!(json["data"]["title"], "Older post");

    let json = body_json(get(app, "/api/v1/entries/latest?type=nope").await).await;
    assert!(json["data"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn source_entries_match_exact_reference(pool: SqlitePool) {
    let state = common::test_state(pool).await;
    let first = common::create_post(&state, "First", None).await;
    common::create_post(&state, "Second", None).await;
    let app = common::build_test_app(state);

    let json = body_json(
        get(app.clone(), &format!("/api/v1/sources/blog.post/{first}/entries")).await,
    )
    .await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["source_id"], first);

    let response = get(app, "/api/v1/sources/blog.comment/1/entries").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// HTML index
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn index_renders_entries_and_navigation(pool: SqlitePool) {
    let state = common::test_state(pool).await;
    for n in 1..=3 {
        common::create_post(&state, &format!("Post <{n}>"), None).await;
    }
    let app = common::build_test_app(state);

    let response = get(app.clone(), "/?page_size=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert_eq!(html.matches("<li").count(), 2);
    assert!(html.contains("Post &lt;3&gt;"));
    assert!(!html.contains("Post <3>"));
    assert!(html.contains("Page 1 of 2 (3 entries)"));
    assert!(html.contains("?page=2"));
    assert!(html.contains("href=\"/feeds/latest\""));

    let html = body_text(get(app.clone(), "/?type=post").await).await;
    assert!(html.contains("<title>Tumblelog: Post</title>"));
    assert!(html.contains("href=\"/feeds/type/blog.post\""));

    let response = get(app, "/?page=9").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn type_templates_from_directories_take_effect(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("blog")).unwrap();
    std::fs::write(
        dir.path().join("blog/post_title.html"),
        "<b>{{ obj.title|upper }}</b>",
    )
    .unwrap();

    let mut config = common::test_journal_config();
    config.template_dirs = vec![dir.path().to_path_buf()];
    let state = common::build_state(pool, config).await;
    common::create_post(&state, "Hello", None).await;
    let app = common::build_test_app(state);

    let json = body_json(get(app, "/api/v1/entries").await).await;
    assert_eq!(json["data"][0]["title"], "<b>HELLO</b>");
    assert_eq!(json["data"][0]["description"], "Hello");
    assert!(json["data"][0]["rendered"]
        .as_str()
        .unwrap()
        .contains("<b>HELLO</b>"));
}
