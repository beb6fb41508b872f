//! Turns journal rows into presentable entries.
//!
//! Each entry's source is loaded through the registry (a placeholder stands
//! in when the source is gone) and its title, description and combined
//! rendering are resolved afresh on every call.

use std::sync::Arc;

use djumblelog_core::content_type::ContentType;
use djumblelog_core::render::{record_context, RenderResolver, ResolvedEntry, Strategy};
use djumblelog_core::source::SourceRecord;
use djumblelog_core::template::{Context, TemplateRegistry, Value};
use djumblelog_db::models::entry::Entry;
use djumblelog_db::repositories::EntryRepo;
use djumblelog_db::Journal;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::pagination::{PageMeta, Paginator};
use crate::query::ListParams;
use crate::state::AppState;

/// Template wrapping one entry in list output.
pub const ENTRY_TEMPLATE: &str = "djumblelog/entry.html";

/// Template wrapping a run of entries.
pub const OBJECT_LIST_TEMPLATE: &str = "djumblelog/object_list.html";

/// An entry with its derived presentation fields.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    /// Short label such as `Post: Hello world`.
    pub label: String,
    /// The source's absolute URL, if it has one.
    pub url: Option<String>,
    pub title: String,
    pub description: String,
    pub rendered: String,
    /// Which strategy produced `rendered`.
    pub rendered_by: Strategy,
    #[serde(skip)]
    resolved: ResolvedEntry,
    #[serde(skip)]
    record: Arc<dyn SourceRecord>,
}

impl RenderedEntry {
    /// The loaded source record (or its placeholder).
    pub fn record(&self) -> &dyn SourceRecord {
        self.record.as_ref()
    }

    /// Context for per-entry templates: `entry`, `obj`, `url`, `title`,
    /// `description` and `rendered`.
    pub fn context(&self) -> Context {
        let mut ctx = record_context(self.record());
        ctx.insert(
            "entry",
            serde_json::to_value(&self.entry).unwrap_or(serde_json::Value::Null),
        );
        ctx.insert("label", self.label.as_str());
        ctx.insert("title", self.resolved.title.to_value());
        ctx.insert("description", self.resolved.description.to_value());
        ctx.insert("rendered", self.resolved.rendered.to_value());
        ctx
    }
}

/// Load and resolve one entry.
pub async fn present(
    journal: &Journal,
    templates: &TemplateRegistry,
    entry: Entry,
) -> AppResult<RenderedEntry> {
    let source = entry
        .source_ref()
        .map_err(|e| AppError::InternalError(format!("entry {}: {e}", entry.id)))?;
    let record = journal.registry().load_or_placeholder(&source).await?;
    let resolved = RenderResolver::new(templates).resolve_all(record.as_ref())?;

    Ok(RenderedEntry {
        label: entry.label(&record.display()),
        url: record.absolute_url(),
        title: resolved.title.text.clone(),
        description: resolved.description.text.clone(),
        rendered: resolved.rendered.text.clone(),
        rendered_by: resolved.rendered.strategy,
        resolved,
        record,
        entry,
    })
}

/// Load and resolve a run of entries, preserving order.
pub async fn present_all(
    journal: &Journal,
    templates: &TemplateRegistry,
    entries: Vec<Entry>,
) -> AppResult<Vec<RenderedEntry>> {
    let mut rendered = Vec::with_capacity(entries.len());
    for entry in entries {
        rendered.push(present(journal, templates, entry).await?);
    }
    Ok(rendered)
}

/// Render entries through `entry.html` and wrap them in `object_list.html`.
pub fn render_list(templates: &TemplateRegistry, entries: &[RenderedEntry]) -> AppResult<String> {
    let mut items = String::new();
    for entry in entries {
        items.push_str(&templates.render(ENTRY_TEMPLATE, &entry.context())?);
    }
    let ctx = Context::new()
        .with("entries", Value::Safe(items))
        .with("count", entries.len() as i64);
    Ok(templates.render(OBJECT_LIST_TEMPLATE, &ctx)?)
}

// ---------------------------------------------------------------------------
// Paged listing
// ---------------------------------------------------------------------------

/// One page of presented entries plus its metadata.
#[derive(Debug)]
pub struct EntryPage {
    pub entries: Vec<RenderedEntry>,
    pub meta: PageMeta,
    /// The resolved type filter, if one was given and resolved.
    pub content_type: Option<ContentType>,
}

/// Load one page of entries, newest first, optionally filtered by type.
///
/// A type filter that does not resolve yields an empty first page rather
/// than an error.
pub async fn load_page(state: &AppState, params: &ListParams) -> AppResult<EntryPage> {
    let paginator = Paginator::new(params.page_size);

    let content_type = match params.type_filter.as_deref() {
        Some(segment) => match state.registry().resolve_segment(segment) {
            Some(ct) => Some(ct),
            None => {
                tracing::debug!(segment, "Type filter does not resolve");
                return Ok(EntryPage {
                    entries: Vec::new(),
                    meta: paginator.page(0, params.page)?,
                    content_type: None,
                });
            }
        },
        None => None,
    };

    let hits = EntryRepo::count(&state.pool, content_type.as_ref()).await?;
    let meta = paginator.page(hits, params.page)?;
    let rows = EntryRepo::list_page(
        &state.pool,
        content_type.as_ref(),
        meta.page_size,
        meta.offset(),
    )
    .await?;

    Ok(EntryPage {
        entries: present_all(&state.journal, &state.templates, rows).await?,
        meta,
        content_type,
    })
}
