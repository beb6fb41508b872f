//! JSON handlers for journal entries.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use djumblelog_core::error::CoreError;
use djumblelog_core::source::SourceRef;
use djumblelog_core::types::DbId;
use djumblelog_db::repositories::EntryRepo;

use crate::error::AppResult;
use crate::presenter::{load_page, present, present_all};
use crate::query::{ListParams, TypeParams};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/entries
///
/// One page of entries, newest first, optionally filtered by `type`.
pub async fn list_entries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let page = load_page(&state, &params).await?;

    Ok(Json(PageResponse {
        data: page.entries,
        pagination: page.meta,
    }))
}

/// GET /api/v1/entries/latest
///
/// The single most recent entry, overall or for one `type`. `data` is null
/// when there is none or the type does not resolve.
pub async fn latest_entry(
    State(state): State<AppState>,
    Query(params): Query<TypeParams>,
) -> AppResult<impl IntoResponse> {
    let latest = match params.type_filter.as_deref() {
        Some(segment) => match state.registry().resolve_segment(segment) {
            Some(ct) => EntryRepo::latest_for_type(&state.pool, &ct).await?,
            None => None,
        },
        None => EntryRepo::list_recent(&state.pool, None, 1)
            .await?
            .into_iter()
            .next(),
    };

    let data = match latest {
        Some(entry) => Some(present(&state.journal, &state.templates, entry).await?),
        None => None,
    };

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/sources/{type}/{id}/entries
///
/// All entries for one source record, newest first.
pub async fn source_entries(
    State(state): State<AppState>,
    Path((type_segment, source_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let content_type = state
        .registry()
        .resolve_segment(&type_segment)
        .ok_or(CoreError::UnknownContentType(type_segment))?;
    let source = SourceRef::new(content_type, source_id);

    let entries = state
        .journal
        .entries_for_source(&source)
        .await?
        .unwrap_or_default();
    let data = present_all(&state.journal, &state.templates, entries).await?;

    Ok(Json(DataResponse { data }))
}
