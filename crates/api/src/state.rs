use std::sync::Arc;

use djumblelog_core::content_type::ContentType;
use djumblelog_core::error::CoreError;
use djumblelog_core::registry::ContentTypeRegistry;
use djumblelog_core::template::TemplateRegistry;
use djumblelog_db::{DbPool, Journal, TableSource};
use djumblelog_events::Signals;

use crate::config::{JournalConfig, ServerConfig};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Tracking lists, template directories and site domain.
    pub journal_config: Arc<JournalConfig>,
    /// Registry-aware journal facade.
    pub journal: Journal,
    /// Layered template lookup used by the render resolver.
    pub templates: Arc<TemplateRegistry>,
    /// Lifecycle signals the host write path dispatches through.
    pub signals: Arc<Signals>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        config: ServerConfig,
        journal_config: JournalConfig,
        registry: ContentTypeRegistry,
        signals: Signals,
    ) -> Self {
        let templates = TemplateRegistry::with_dirs(journal_config.template_dirs.clone());
        Self {
            journal: Journal::new(pool.clone(), Arc::new(registry)),
            pool,
            config: Arc::new(config),
            journal_config: Arc::new(journal_config),
            templates: Arc::new(templates),
            signals: Arc::new(signals),
        }
    }

    pub fn registry(&self) -> &ContentTypeRegistry {
        self.journal.registry()
    }
}

/// Register a [`TableSource`] for every identifier.
///
/// Fails with a configuration error when an identifier is malformed or its
/// backing table is missing.
pub async fn build_registry(
    pool: &DbPool,
    identifiers: &[String],
) -> Result<ContentTypeRegistry, CoreError> {
    let mut registry = ContentTypeRegistry::new();
    for identifier in identifiers {
        let content_type = ContentType::parse(identifier).map_err(|e| {
            CoreError::Configuration(format!("invalid content type '{identifier}': {e}"))
        })?;
        let source = TableSource::connect(pool.clone(), content_type.clone()).await?;
        registry.register(content_type, Arc::new(source));
    }
    Ok(registry)
}
