//! Generic source loader over a plain SQL table.
//!
//! Lets the standalone server track host tables without custom Rust code.
//! The table for `app_label.model` is `<app_label>_<model>` and must have an
//! integer `id` column. Every column is exposed to templates as `obj.<name>`;
//! the display string comes from the first non-empty `title`, `name` or
//! `headline` column, and the absolute URL from a `url` column.

use std::sync::Arc;

use async_trait::async_trait;
use djumblelog_core::content_type::ContentType;
use djumblelog_core::error::CoreError;
use djumblelog_core::source::{SourceLoader, SourceRecord, SourceRef};
use djumblelog_core::types::DbId;
use serde_json::{Map, Value as Json};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row};

use crate::DbPool;

/// Columns consulted, in order, for the display string.
const DISPLAY_COLUMNS: &[&str] = &["title", "name", "headline"];

/// Loads records of one content type from its backing table.
#[derive(Debug)]
pub struct TableSource {
    pool: DbPool,
    content_type: ContentType,
    table: String,
}

impl TableSource {
    /// Table name for a content type: `blog.post` lives in `blog_post`.
    pub fn table_name(content_type: &ContentType) -> String {
        format!("{}_{}", content_type.app_label(), content_type.model())
    }

    /// Build a loader, failing with a configuration error if the backing
    /// table does not exist.
    pub async fn connect(pool: DbPool, content_type: ContentType) -> Result<Self, CoreError> {
        let table = Self::table_name(&content_type);

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = $1",
        )
        .bind(&table)
        .fetch_one(&pool)
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?;

        if exists == 0 {
            return Err(CoreError::Configuration(format!(
                "Content type {content_type} has no backing table '{table}'"
            )));
        }

        Ok(Self {
            pool,
            content_type,
            table,
        })
    }
}

#[async_trait]
impl SourceLoader for TableSource {
    async fn load(&self, id: DbId) -> Result<Option<Arc<dyn SourceRecord>>, CoreError> {
        // The table name is built from validated identifier segments.
        let query = format!("SELECT * FROM \"{}\" WHERE id = $1", self.table);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(e.to_string()))?;

        Ok(row.map(|row| {
            Arc::new(TableRecord {
                source: SourceRef::new(self.content_type.clone(), id),
                fields: row_fields(&row),
            }) as Arc<dyn SourceRecord>
        }))
    }
}

/// A row loaded by [`TableSource`].
#[derive(Debug, Clone)]
pub struct TableRecord {
    source: SourceRef,
    fields: Map<String, Json>,
}

impl SourceRecord for TableRecord {
    fn source_ref(&self) -> &SourceRef {
        &self.source
    }

    fn display(&self) -> String {
        DISPLAY_COLUMNS
            .iter()
            .filter_map(|column| self.fields.get(*column).and_then(Json::as_str))
            .find(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "{} object ({})",
                    self.source.content_type.class_name(),
                    self.source.id
                )
            })
    }

    fn fields(&self) -> Map<String, Json> {
        self.fields.clone()
    }

    fn absolute_url(&self) -> Option<String> {
        self.fields
            .get("url")
            .and_then(Json::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

/// Decode every column of a row into JSON, by SQLite storage class.
fn row_fields(row: &SqliteRow) -> Map<String, Json> {
    row.columns()
        .iter()
        .map(|column| {
            let i = column.ordinal();
            let value = if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
                v.map_or(Json::Null, Json::from)
            } else if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
                v.map_or(Json::Null, Json::from)
            } else if let Ok(v) = row.try_get::<Option<String>, _>(i) {
                v.map_or(Json::Null, Json::from)
            } else {
                Json::Null
            };
            (column.name().to_string(), value)
        })
        .collect()
}
