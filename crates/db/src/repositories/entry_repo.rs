//! Repository for the `entries` table.

use djumblelog_core::content_type::ContentType;
use djumblelog_core::source::SourceRef;
use sqlx::SqliteExecutor;

use crate::models::entry::{Entry, EntryOrder};
use crate::DbPool;

/// Column list for `entries` queries.
const COLUMNS: &str = "id, created_at, source_type, source_id";

/// Provides insert, query and delete operations for journal entries.
/// Entries are never updated.
pub struct EntryRepo;

impl EntryRepo {
    /// Insert one entry for `source` stamped with the current time.
    pub async fn log<'e, E>(executor: E, source: &SourceRef) -> Result<Entry, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO entries (created_at, source_type, source_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Entry>(&query)
            .bind(chrono::Utc::now())
            .bind(source.content_type.identifier())
            .bind(source.id)
            .fetch_one(executor)
            .await
    }

    /// Find an entry by its ID.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Entry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM entries WHERE id = $1");
        sqlx::query_as::<_, Entry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All entries for one content type in the requested order.
    pub async fn list_for_type(
        pool: &DbPool,
        content_type: &ContentType,
        order: EntryOrder,
    ) -> Result<Vec<Entry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM entries WHERE source_type = $1 ORDER BY {}",
            order.sql()
        );
        sqlx::query_as::<_, Entry>(&query)
            .bind(content_type.identifier())
            .fetch_all(pool)
            .await
    }

    /// All entries referencing exactly this `(type, id)`, newest first.
    pub async fn list_for_source<'e, E>(
        executor: E,
        source: &SourceRef,
    ) -> Result<Vec<Entry>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM entries \
             WHERE source_type = $1 AND source_id = $2 \
             ORDER BY {}",
            EntryOrder::NewestFirst.sql()
        );
        sqlx::query_as::<_, Entry>(&query)
            .bind(source.content_type.identifier())
            .bind(source.id)
            .fetch_all(executor)
            .await
    }

    /// Delete every entry referencing this `(type, id)`.
    ///
    /// Returns `true` if at least one row was removed.
    pub async fn delete_for_source<'e, E>(
        executor: E,
        source: &SourceRef,
    ) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM entries WHERE source_type = $1 AND source_id = $2")
            .bind(source.content_type.identifier())
            .bind(source.id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The most recent entry for a content type.
    pub async fn latest_for_type(
        pool: &DbPool,
        content_type: &ContentType,
    ) -> Result<Option<Entry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM entries WHERE source_type = $1 ORDER BY {} LIMIT 1",
            EntryOrder::NewestFirst.sql()
        );
        sqlx::query_as::<_, Entry>(&query)
            .bind(content_type.identifier())
            .fetch_optional(pool)
            .await
    }

    /// The `limit` most recent entries, optionally restricted to one type.
    pub async fn list_recent(
        pool: &DbPool,
        content_type: Option<&ContentType>,
        limit: i64,
    ) -> Result<Vec<Entry>, sqlx::Error> {
        Self::list_page(pool, content_type, limit, 0).await
    }

    /// One page of entries, newest first, optionally restricted to one type.
    pub async fn list_page(
        pool: &DbPool,
        content_type: Option<&ContentType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Entry>, sqlx::Error> {
        let order = EntryOrder::NewestFirst.sql();
        match content_type {
            Some(ct) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM entries WHERE source_type = $1 \
                     ORDER BY {order} LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, Entry>(&query)
                    .bind(ct.identifier())
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM entries ORDER BY {order} LIMIT $1 OFFSET $2");
                sqlx::query_as::<_, Entry>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Count entries, optionally restricted to one type.
    pub async fn count(
        pool: &DbPool,
        content_type: Option<&ContentType>,
    ) -> Result<i64, sqlx::Error> {
        match content_type {
            Some(ct) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entries WHERE source_type = $1")
                    .bind(ct.identifier())
                    .fetch_one(pool)
                    .await
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entries")
                    .fetch_one(pool)
                    .await
            }
        }
    }
}
