//! Content type registry.
//!
//! Maps each trackable [`ContentType`] to the [`SourceLoader`] that knows how
//! to materialize its records. Failing to resolve an identifier here is a
//! distinct outcome (`None`) from a resolved type that has no journal rows.

use std::collections::HashMap;
use std::sync::Arc;

use crate::content_type::ContentType;
use crate::error::CoreError;
use crate::source::{MissingSource, SourceLoader, SourceRecord, SourceRef};

/// Registry of source loaders keyed by content type.
#[derive(Default, Clone)]
pub struct ContentTypeRegistry {
    loaders: HashMap<ContentType, Arc<dyn SourceLoader>>,
}

impl ContentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the loader for a content type.
    pub fn register(&mut self, content_type: ContentType, loader: Arc<dyn SourceLoader>) {
        tracing::debug!(content_type = %content_type, "Registered source loader");
        self.loaders.insert(content_type, loader);
    }

    pub fn contains(&self, content_type: &ContentType) -> bool {
        self.loaders.contains_key(content_type)
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// All registered content types, sorted by identifier.
    pub fn content_types(&self) -> Vec<ContentType> {
        let mut types: Vec<ContentType> = self.loaders.keys().cloned().collect();
        types.sort();
        types
    }

    /// Resolve a full `app_label.model` identifier to a registered type.
    pub fn resolve(&self, identifier: &str) -> Option<ContentType> {
        let content_type = ContentType::parse(identifier).ok()?;
        self.contains(&content_type).then_some(content_type)
    }

    /// Resolve a URL path segment to a registered type.
    ///
    /// Accepts either a full identifier or a bare model name. A bare model
    /// name that matches more than one registered app does not resolve.
    pub fn resolve_segment(&self, segment: &str) -> Option<ContentType> {
        if segment.contains('.') {
            return self.resolve(segment);
        }

        let model = segment.trim().to_lowercase();
        let mut matches = self.loaders.keys().filter(|ct| ct.model() == model);
        let first = matches.next()?.clone();
        if matches.next().is_some() {
            tracing::debug!(segment, "Ambiguous model name in type segment");
            return None;
        }
        Some(first)
    }

    /// Load the record behind a reference.
    ///
    /// Returns `Ok(None)` when the record no longer exists and
    /// [`CoreError::UnknownContentType`] when the type is not registered.
    pub async fn load(
        &self,
        source: &SourceRef,
    ) -> Result<Option<Arc<dyn SourceRecord>>, CoreError> {
        let loader = self
            .loaders
            .get(&source.content_type)
            .ok_or_else(|| CoreError::UnknownContentType(source.content_type.identifier()))?;
        loader.load(source.id).await
    }

    /// Load the record behind a reference, substituting a [`MissingSource`]
    /// placeholder for deleted records and unregistered types.
    pub async fn load_or_placeholder(
        &self,
        source: &SourceRef,
    ) -> Result<Arc<dyn SourceRecord>, CoreError> {
        match self.load(source).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) | Err(CoreError::UnknownContentType(_)) => {
                tracing::debug!(
                    source_type = %source.content_type,
                    source_id = source.id,
                    "Journal entry references a missing source"
                );
                Ok(Arc::new(MissingSource::new(source.clone())))
            }
            Err(e) => Err(e),
        }
    }
}
