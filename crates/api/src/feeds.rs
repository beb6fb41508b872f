//! Syndication feeds over the journal.
//!
//! Two feeds are addressable under `/feeds/`:
//!
//! ```text
//! latest              most recent entries of every type
//! type/<segment>      most recent entries of one type
//! ```
//!
//! `<segment>` is a full `app_label.model` identifier or an unambiguous
//! model name. Anything else is "feed not found".

use djumblelog_core::content_type::ContentType;
use djumblelog_core::registry::ContentTypeRegistry;
use djumblelog_core::types::Timestamp;
use djumblelog_db::repositories::EntryRepo;

use crate::error::{AppError, AppResult};
use crate::presenter::{present_all, RenderedEntry};
use crate::state::AppState;

/// Items per feed.
pub const FEED_SIZE: i64 = 10;

pub const LATEST_DESCRIPTION_TEMPLATE: &str = "djumblelog/feed_latest_description.html";
pub const TYPE_DESCRIPTION_TEMPLATE: &str = "djumblelog/feed_type_description.html";

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Which feed a URL addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedKind {
    Latest,
    ByType(ContentType),
}

impl FeedKind {
    /// Resolve the path after `/feeds/`.
    pub fn from_url(registry: &ContentTypeRegistry, url: &str) -> AppResult<Self> {
        let bits: Vec<&str> = url.trim_matches('/').split('/').collect();
        match bits.as_slice() {
            ["latest"] => Ok(Self::Latest),
            ["type", segment] => registry
                .resolve_segment(segment)
                .map(Self::ByType)
                .ok_or_else(|| feed_not_found(url)),
            _ => Err(feed_not_found(url)),
        }
    }

    fn description_template(&self) -> &'static str {
        match self {
            Self::Latest => LATEST_DESCRIPTION_TEMPLATE,
            Self::ByType(_) => TYPE_DESCRIPTION_TEMPLATE,
        }
    }
}

fn feed_not_found(url: &str) -> AppError {
    tracing::debug!(url, "Feed not found");
    AppError::NotFound(format!("Feed not found: {url}"))
}

// ---------------------------------------------------------------------------
// Feed model
// ---------------------------------------------------------------------------

/// A feed ready for serialization.
#[derive(Debug, Clone)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Absolute URL of the feed itself.
    pub feed_url: String,
    /// Newest item date, or now for an empty feed.
    pub updated: Timestamp,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone)]
pub struct FeedItem {
    /// HTML, as produced by the render resolver.
    pub title: String,
    pub link: String,
    /// HTML rendered through the feed's description template.
    pub description: String,
    pub guid: String,
    pub pub_date: Timestamp,
}

/// Load and render the items of a feed.
pub async fn build_feed(state: &AppState, kind: &FeedKind, feed_path: &str) -> AppResult<Feed> {
    let site_link = state.journal_config.site_link();

    let (title, description, filter) = match kind {
        FeedKind::Latest => (
            "Tumblelog".to_string(),
            "Latest Tumblelog entries".to_string(),
            None,
        ),
        FeedKind::ByType(content_type) => (
            format!("Tumblelog: Entries for {}", content_type.class_name()),
            format!("Tumblelog: Entries for {content_type}"),
            Some(content_type),
        ),
    };

    let entries = EntryRepo::list_recent(&state.pool, filter, FEED_SIZE).await?;
    let rendered = present_all(&state.journal, &state.templates, entries).await?;

    let mut items = Vec::with_capacity(rendered.len());
    for entry in &rendered {
        items.push(FeedItem {
            title: entry.title.clone(),
            link: item_link(&site_link, entry),
            description: state
                .templates
                .render(kind.description_template(), &entry.context())?,
            guid: format!("{site_link}/#entry-{}", entry.entry.id),
            pub_date: entry.entry.created_at,
        });
    }

    Ok(Feed {
        title,
        link: site_link.clone(),
        description,
        feed_url: format!("{site_link}{feed_path}"),
        updated: items
            .first()
            .map(|item| item.pub_date)
            .unwrap_or_else(chrono::Utc::now),
        items,
    })
}

/// The source's URL made absolute, or the entry's anchor on the site.
fn item_link(site_link: &str, entry: &RenderedEntry) -> String {
    match entry.url.as_deref() {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.to_string(),
        Some(url) if url.starts_with('/') => format!("{site_link}{url}"),
        Some(url) => format!("{site_link}/{url}"),
        None => format!("{site_link}/#entry-{}", entry.entry.id),
    }
}
