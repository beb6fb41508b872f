pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /entries                                         paged list (?page, page_size, type)
/// /entries/latest                                  most recent entry (?type)
/// /sources/{type}/{id}/entries                     entries for one source record
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(handlers::entries::list_entries))
        .route("/entries/latest", get(handlers::entries::latest_entry))
        .route(
            "/sources/{type}/{id}/entries",
            get(handlers::entries::source_entries),
        )
}

/// Build the root-level HTML and feed routes.
///
/// ```text
/// /                                                HTML index (?page, page_size, type)
/// /snippet                                         embeddable fragment (?count)
/// /feeds/latest                                    latest entries feed (?format)
/// /feeds/type/{segment}                            per-type feed (?format)
/// ```
pub fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/snippet", get(handlers::pages::snippet))
        .route("/feeds/{*url}", get(handlers::feeds::feed))
}
