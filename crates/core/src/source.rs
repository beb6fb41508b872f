//! Source records: the external objects journal entries point at.
//!
//! The journal never owns source data. It stores a [`SourceRef`] and asks the
//! [`SourceLoader`] registered for that content type to materialize a
//! [`SourceRecord`] when an entry is presented.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::content_type::ContentType;
use crate::error::CoreError;
use crate::types::DbId;

/// Polymorphic `(type, id)` reference to a source record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRef {
    pub content_type: ContentType,
    pub id: DbId,
}

impl SourceRef {
    pub fn new(content_type: ContentType, id: DbId) -> Self {
        Self { content_type, id }
    }
}

/// A loaded source record.
///
/// Only [`display`](SourceRecord::display) is required. The `title`,
/// `description` and `render` hooks are per-instance overrides consulted
/// first by the render resolver; returning `None` means "not provided".
pub trait SourceRecord: Send + Sync {
    /// The reference this record was loaded from.
    fn source_ref(&self) -> &SourceRef;

    /// Plain string conversion, used as the last-resort title/description.
    fn display(&self) -> String;

    /// Named fields exposed to templates as `obj.<field>`.
    fn fields(&self) -> Map<String, Value> {
        Map::new()
    }

    fn absolute_url(&self) -> Option<String> {
        None
    }

    fn title(&self) -> Option<String> {
        None
    }

    fn description(&self) -> Option<String> {
        None
    }

    fn render(&self) -> Option<String> {
        None
    }
}

impl std::fmt::Debug for dyn SourceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRecord")
            .field("source", self.source_ref())
            .field("display", &self.display())
            .finish()
    }
}

/// Per-type handler that loads source records by id.
#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// Load the record with the given id, or `None` if it no longer exists.
    async fn load(&self, id: DbId) -> Result<Option<Arc<dyn SourceRecord>>, CoreError>;
}

/// Stand-in for an orphaned entry whose source row is gone.
#[derive(Debug, Clone)]
pub struct MissingSource {
    source: SourceRef,
}

impl MissingSource {
    pub fn new(source: SourceRef) -> Self {
        Self { source }
    }
}

impl SourceRecord for MissingSource {
    fn source_ref(&self) -> &SourceRef {
        &self.source
    }

    fn display(&self) -> String {
        format!(
            "{} #{} (deleted)",
            self.source.content_type.class_name(),
            self.source.id
        )
    }

    fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("id".into(), Value::from(self.source.id));
        fields.insert("deleted".into(), Value::Bool(true));
        fields
    }
}
