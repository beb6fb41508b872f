//! Embeddable snippet of the most recent entries.

use djumblelog_db::repositories::EntryRepo;

use crate::error::AppResult;
use crate::pagination::MAX_PAGE_SIZE;
use crate::presenter::{present_all, render_list};
use crate::state::AppState;

/// Entries shown when no count is given.
pub const DEFAULT_SNIPPET_COUNT: i64 = 10;

/// Render the `count` most recent entries through `djumblelog/object_list.html`.
///
/// Host pages embed the returned markup directly. `count` is clamped to
/// `0..=MAX_PAGE_SIZE`; zero yields an empty list.
pub async fn show_djumblelog(state: &AppState, count: i64) -> AppResult<String> {
    let count = count.clamp(0, MAX_PAGE_SIZE);
    let entries = EntryRepo::list_recent(&state.pool, None, count).await?;
    let rendered = present_all(&state.journal, &state.templates, entries).await?;
    render_list(&state.templates, &rendered)
}
