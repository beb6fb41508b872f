//! Feed handler.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::AppResult;
use crate::feeds::{build_feed, FeedKind};
use crate::query::FeedParams;
use crate::state::AppState;
use crate::syndication::FeedFormat;

/// GET /feeds/{*url}
///
/// `latest` or `type/<segment>`; `?format=atom` for Atom, RSS otherwise.
pub async fn feed(
    State(state): State<AppState>,
    Path(url): Path<String>,
    Query(params): Query<FeedParams>,
) -> AppResult<impl IntoResponse> {
    let kind = FeedKind::from_url(state.registry(), &url)?;
    let feed = build_feed(&state, &kind, &format!("/feeds/{url}")).await?;

    let format = FeedFormat::from_param(params.format.as_deref());
    let body = format.write(&feed)?;

    Ok(([(header::CONTENT_TYPE, format.mime_type())], body))
}
