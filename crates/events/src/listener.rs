//! Journal listener and its startup wiring.

use std::sync::Arc;

use async_trait::async_trait;
use djumblelog_core::content_type::ContentType;
use djumblelog_core::error::CoreError;
use djumblelog_core::registry::ContentTypeRegistry;
use djumblelog_db::repositories::EntryRepo;
use djumblelog_db::JournalError;
use sqlx::SqliteConnection;

use crate::signals::{LifecycleEvent, Receiver, ReceiverId, SignalKind, Signals};

// ---------------------------------------------------------------------------
// JournalListener
// ---------------------------------------------------------------------------

/// Writes journal entries in response to lifecycle events.
///
/// Creation logs one entry; updates are ignored. Deletion removes every
/// entry for the record. Both writes use the host's connection.
pub struct JournalListener;

#[async_trait]
impl Receiver for JournalListener {
    async fn receive(
        &self,
        conn: &mut SqliteConnection,
        event: &LifecycleEvent,
    ) -> Result<(), JournalError> {
        match event {
            LifecycleEvent::Saved {
                source,
                created: true,
            } => {
                let entry = EntryRepo::log(&mut *conn, source).await?;
                tracing::info!(
                    entry_id = entry.id,
                    source_type = %entry.source_type,
                    source_id = entry.source_id,
                    "Journal entry logged"
                );
            }
            LifecycleEvent::Saved { created: false, .. } => {}
            LifecycleEvent::Deleting { source } => {
                if EntryRepo::delete_for_source(&mut *conn, source).await? {
                    tracing::info!(
                        source_type = %source.content_type,
                        source_id = source.id,
                        "Journal entries removed"
                    );
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Which content types are tracked for creation and for deletion.
///
/// The lists are independent. `None` means the list was not configured at
/// all, which disables that half of the tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingConfig {
    pub models: Option<Vec<String>>,
    pub models_delete: Option<Vec<String>>,
}

impl TrackingConfig {
    /// Every identifier named by either list, deduplicated, in order.
    pub fn all_identifiers(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        let lists = self.models.iter().chain(self.models_delete.iter());
        for identifier in lists.flatten() {
            if !all.contains(identifier) {
                all.push(identifier.clone());
            }
        }
        all
    }
}

/// Receiver handles created by [`connect_journal`].
#[derive(Debug, Default)]
pub struct JournalConnections {
    pub post_save: Vec<(ContentType, ReceiverId)>,
    pub pre_delete: Vec<(ContentType, ReceiverId)>,
}

/// Connect a [`JournalListener`] for every configured type.
///
/// Any identifier that fails to parse or is not registered is a fatal
/// configuration error. Nothing is connected in that case.
pub fn connect_journal(
    signals: &mut Signals,
    registry: &ContentTypeRegistry,
    config: &TrackingConfig,
) -> Result<JournalConnections, CoreError> {
    let create_types = resolve_all(registry, config.models.as_deref(), "DJUMBLELOG_MODELS")?;
    let delete_types = resolve_all(
        registry,
        config.models_delete.as_deref(),
        "DJUMBLELOG_MODELS_DELETE",
    )?;

    let listener: Arc<dyn Receiver> = Arc::new(JournalListener);
    let mut connections = JournalConnections::default();

    for content_type in create_types {
        let id = signals.connect(SignalKind::PostSave, content_type.clone(), listener.clone());
        connections.post_save.push((content_type, id));
    }
    for content_type in delete_types {
        let id = signals.connect(SignalKind::PreDelete, content_type.clone(), listener.clone());
        connections.pre_delete.push((content_type, id));
    }

    tracing::info!(
        create = connections.post_save.len(),
        delete = connections.pre_delete.len(),
        "Journal listener connected"
    );
    Ok(connections)
}

fn resolve_all(
    registry: &ContentTypeRegistry,
    identifiers: Option<&[String]>,
    setting: &str,
) -> Result<Vec<ContentType>, CoreError> {
    let Some(identifiers) = identifiers else {
        return Ok(Vec::new());
    };

    let mut resolved: Vec<ContentType> = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        let content_type = ContentType::parse(identifier).map_err(|e| {
            CoreError::Configuration(format!("{setting}: invalid identifier '{identifier}': {e}"))
        })?;
        if !registry.contains(&content_type) {
            return Err(CoreError::Configuration(format!(
                "{setting}: content type '{identifier}' is not registered"
            )));
        }
        if !resolved.contains(&content_type) {
            resolved.push(content_type);
        }
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_identifiers_merges_both_lists() {
        let config = TrackingConfig {
            models: Some(strings(&["blog.post", "links.link"])),
            models_delete: Some(strings(&["links.link", "photos.photo"])),
        };
        assert_eq!(
            config.all_identifiers(),
            strings(&["blog.post", "links.link", "photos.photo"])
        );
        assert!(TrackingConfig::default().all_identifiers().is_empty());
    }
}
