//! Integration tests for the generic SQL-table source loader.

use assert_matches::assert_matches;
use djumblelog_core::content_type::ContentType;
use djumblelog_core::error::CoreError;
use djumblelog_core::source::SourceLoader;
use djumblelog_db::TableSource;
use sqlx::SqlitePool;

async fn create_post_table(pool: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE blog_post (
            id INTEGER PRIMARY KEY,
            title TEXT,
            url TEXT,
            rating REAL,
            views INTEGER
        )",
    )
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn connect_requires_backing_table(pool: SqlitePool) {
    let result = TableSource::connect(pool, ContentType::parse("blog.post").unwrap()).await;
    assert_matches!(result, Err(CoreError::Configuration(ref msg)) if msg.contains("blog_post"));
}

#[sqlx::test(migrations = "./migrations")]
async fn loads_row_as_record(pool: SqlitePool) {
    create_post_table(&pool).await;
    sqlx::query(
        "INSERT INTO blog_post (id, title, url, rating, views) \
         VALUES (3, 'Hello world', '/blog/hello/', 4.5, 10)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let source = TableSource::connect(pool, ContentType::parse("blog.post").unwrap())
        .await
        .unwrap();
    let record = source.load(3).await.unwrap().unwrap();

    assert_eq!(record.display(), "Hello world");
    assert_eq!(record.absolute_url().as_deref(), Some("/blog/hello/"));
    assert_eq!(record.source_ref().id, 3);

    let fields = record.fields();
    assert_eq!(fields["views"], 10);
    assert_eq!(fields["rating"], 4.5);
    assert_eq!(fields["title"], "Hello world");
}

#[sqlx::test(migrations = "./migrations")]
async fn display_falls_back_to_class_and_id(pool: SqlitePool) {
    create_post_table(&pool).await;
    sqlx::query("INSERT INTO blog_post (id) VALUES (8)")
        .execute(&pool)
        .await
        .unwrap();

    let source = TableSource::connect(pool, ContentType::parse("blog.post").unwrap())
        .await
        .unwrap();
    let record = source.load(8).await.unwrap().unwrap();

    assert_eq!(record.display(), "Post object (8)");
    assert!(record.absolute_url().is_none());
    assert!(record.fields()["title"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn missing_row_loads_as_none(pool: SqlitePool) {
    create_post_table(&pool).await;
    let source = TableSource::connect(pool, ContentType::parse("blog.post").unwrap())
        .await
        .unwrap();

    assert!(source.load(404).await.unwrap().is_none());
}
