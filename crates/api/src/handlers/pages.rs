//! HTML handlers: the paginated index and the embeddable snippet.

use axum::extract::{Query, State};
use axum::response::Html;
use djumblelog_core::template::{Context, Value};
use serde_json::json;

use crate::error::AppResult;
use crate::presenter::{load_page, render_list};
use crate::query::{ListParams, SnippetParams};
use crate::snippet::{show_djumblelog, DEFAULT_SNIPPET_COUNT};
use crate::state::AppState;

pub const INDEX_TEMPLATE: &str = "djumblelog/index.html";

/// GET /
///
/// Paginated HTML list of entries, optionally filtered by `type`.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let page = load_page(&state, &params).await?;
    let object_list = render_list(&state.templates, &page.entries)?;
    let meta = &page.meta;

    let (type_name, feed_url, filter_query) = match &page.content_type {
        Some(ct) => (
            ct.class_name(),
            format!("/feeds/type/{ct}"),
            format!("&type={ct}"),
        ),
        None => (String::new(), "/feeds/latest".to_string(), String::new()),
    };

    let ctx = Context::new()
        .with("type_name", type_name)
        .with("feed_url", feed_url)
        .with("filter_query", filter_query)
        .with("object_list", Value::Safe(object_list))
        .with("page", meta.page)
        .with("pages", meta.pages)
        .with("hits", meta.hits)
        .with("has_next", meta.has_next)
        .with("has_previous", meta.has_previous)
        .with("next", json!(meta.next))
        .with("previous", json!(meta.previous));

    Ok(Html(state.templates.render(INDEX_TEMPLATE, &ctx)?))
}

/// GET /snippet
///
/// The `count` most recent entries (default 10) as an embeddable fragment.
pub async fn snippet(
    State(state): State<AppState>,
    Query(params): Query<SnippetParams>,
) -> AppResult<Html<String>> {
    let count = params.count.unwrap_or(DEFAULT_SNIPPET_COUNT);
    Ok(Html(show_djumblelog(&state, count).await?))
}
