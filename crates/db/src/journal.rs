//! Registry-aware journal facade.
//!
//! [`EntryRepo`] works on already-resolved content types. [`Journal`] adds
//! identifier resolution against the [`ContentTypeRegistry`]: an identifier
//! that does not resolve yields `None` rather than an error, so callers can
//! tell "unknown type" apart from "known type, no rows".

use std::sync::Arc;

use djumblelog_core::content_type::ContentType;
use djumblelog_core::error::CoreError;
use djumblelog_core::registry::ContentTypeRegistry;
use djumblelog_core::source::SourceRef;

use crate::error::JournalError;
use crate::models::entry::{Entry, EntryOrder};
use crate::repositories::EntryRepo;
use crate::DbPool;

/// Journal operations over a pool and the registered content types.
#[derive(Clone)]
pub struct Journal {
    pool: DbPool,
    registry: Arc<ContentTypeRegistry>,
}

impl Journal {
    pub fn new(pool: DbPool, registry: Arc<ContentTypeRegistry>) -> Self {
        Self { pool, registry }
    }

    pub fn registry(&self) -> &ContentTypeRegistry {
        &self.registry
    }

    /// All entries for a type identifier; `None` if it does not resolve.
    pub async fn entries_for_type(
        &self,
        identifier: &str,
        order: EntryOrder,
    ) -> Result<Option<Vec<Entry>>, sqlx::Error> {
        let Some(content_type) = self.registry.resolve(identifier) else {
            return Ok(None);
        };
        EntryRepo::list_for_type(&self.pool, &content_type, order)
            .await
            .map(Some)
    }

    /// All entries for one source record; `None` if its type is unregistered.
    pub async fn entries_for_source(
        &self,
        source: &SourceRef,
    ) -> Result<Option<Vec<Entry>>, sqlx::Error> {
        if !self.registry.contains(&source.content_type) {
            return Ok(None);
        }
        EntryRepo::list_for_source(&self.pool, source).await.map(Some)
    }

    /// Remove all entries for one source record. Returns whether any existed.
    pub async fn delete_entries_for_source(&self, source: &SourceRef) -> Result<bool, sqlx::Error> {
        let deleted = EntryRepo::delete_for_source(&self.pool, source).await?;
        if deleted {
            tracing::info!(
                source_type = %source.content_type,
                source_id = source.id,
                "Journal entries removed"
            );
        }
        Ok(deleted)
    }

    /// The newest entry for a type identifier, if any.
    pub async fn latest_for_type(&self, identifier: &str) -> Result<Option<Entry>, sqlx::Error> {
        let Some(content_type) = self.registry.resolve(identifier) else {
            return Ok(None);
        };
        EntryRepo::latest_for_type(&self.pool, &content_type).await
    }

    /// Record a new entry for a source of a registered type.
    pub async fn log(&self, source: &SourceRef) -> Result<Entry, JournalError> {
        self.ensure_registered(&source.content_type)?;
        let entry = EntryRepo::log(&self.pool, source).await?;
        tracing::info!(
            entry_id = entry.id,
            source_type = %entry.source_type,
            source_id = entry.source_id,
            "Journal entry logged"
        );
        Ok(entry)
    }

    fn ensure_registered(&self, content_type: &ContentType) -> Result<(), CoreError> {
        if self.registry.contains(content_type) {
            Ok(())
        } else {
            Err(CoreError::UnknownContentType(content_type.identifier()))
        }
    }
}
