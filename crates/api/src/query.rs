//! Shared query parameter types for handlers.

use serde::Deserialize;

/// Paged listing parameters (`?page=&page_size=&type=`).
///
/// `page` is 1-based. `page_size` is clamped by [`Paginator`](crate::pagination::Paginator).
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Content type filter: a full identifier or an unambiguous model name.
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
}

/// Snippet parameters (`?count=`).
#[derive(Debug, Deserialize)]
pub struct SnippetParams {
    pub count: Option<i64>,
}

/// Optional type filter (`?type=`).
#[derive(Debug, Deserialize)]
pub struct TypeParams {
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
}

/// Feed format selector (`?format=rss|atom`).
#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub format: Option<String>,
}
