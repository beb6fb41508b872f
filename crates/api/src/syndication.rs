//! RSS 2.0 and Atom serialization for [`Feed`]s.

use std::borrow::Cow;

use chrono::SecondsFormat;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::AppError;
use crate::feeds::Feed;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Output syntax for a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedFormat {
    #[default]
    Rss,
    Atom,
}

impl FeedFormat {
    /// `atom` selects Atom; anything else (or nothing) selects RSS.
    pub fn from_param(format: Option<&str>) -> Self {
        match format {
            Some(f) if f.eq_ignore_ascii_case("atom") => Self::Atom,
            _ => Self::Rss,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Rss => "application/rss+xml; charset=utf-8",
            Self::Atom => "application/atom+xml; charset=utf-8",
        }
    }

    pub fn write(self, feed: &Feed) -> Result<String, FeedWriteError> {
        match self {
            Self::Rss => write_rss(feed),
            Self::Atom => write_atom(feed),
        }
    }
}

/// The XML writer failed.
#[derive(Debug, thiserror::Error)]
#[error("Feed serialization failed: {0}")]
pub struct FeedWriteError(String);

impl From<FeedWriteError> for AppError {
    fn from(err: FeedWriteError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// RSS 2.0
// ---------------------------------------------------------------------------

/// Serialize a feed as RSS 2.0.
pub fn write_rss(feed: &Feed) -> Result<String, FeedWriteError> {
    let mut xml = XmlOut::new()?;
    xml.start("rss", &[("version", "2.0"), ("xmlns:atom", ATOM_NS)])?;
    xml.start("channel", &[])?;
    xml.text_element("title", &feed.title)?;
    xml.text_element("link", &feed.link)?;
    xml.text_element("description", &feed.description)?;
    xml.empty(
        "atom:link",
        &[("href", feed.feed_url.as_str()), ("rel", "self")],
    )?;
    xml.text_element("lastBuildDate", &feed.updated.to_rfc2822())?;

    for item in &feed.items {
        xml.start("item", &[])?;
        xml.text_element("title", &plain_title(&item.title))?;
        xml.text_element("link", &item.link)?;
        xml.text_element("description", &item.description)?;
        xml.text_element("pubDate", &item.pub_date.to_rfc2822())?;
        xml.start("guid", &[("isPermaLink", "false")])?;
        xml.text(&item.guid)?;
        xml.end("guid")?;
        xml.end("item")?;
    }

    xml.end("channel")?;
    xml.end("rss")?;
    xml.finish()
}

/// RSS readers show `<title>` as text, so decode the entities autoescape
/// added. Titles with entities XML does not define are left as they are.
fn plain_title(html: &str) -> Cow<'_, str> {
    unescape(html).unwrap_or(Cow::Borrowed(html))
}

// ---------------------------------------------------------------------------
// Atom
// ---------------------------------------------------------------------------

/// Serialize a feed as Atom 1.0.
pub fn write_atom(feed: &Feed) -> Result<String, FeedWriteError> {
    let mut xml = XmlOut::new()?;
    xml.start("feed", &[("xmlns", ATOM_NS)])?;
    xml.text_element("title", &feed.title)?;
    xml.empty("link", &[("href", feed.link.as_str()), ("rel", "alternate")])?;
    xml.empty("link", &[("href", feed.feed_url.as_str()), ("rel", "self")])?;
    xml.text_element("id", &feed.link)?;
    xml.text_element("subtitle", &feed.description)?;
    xml.text_element("updated", &atom_date(feed.updated))?;

    for item in &feed.items {
        xml.start("entry", &[])?;
        xml.start("title", &[("type", "html")])?;
        xml.text(&item.title)?;
        xml.end("title")?;
        xml.empty("link", &[("href", item.link.as_str()), ("rel", "alternate")])?;
        xml.text_element("id", &item.guid)?;
        xml.text_element("updated", &atom_date(item.pub_date))?;
        xml.text_element("published", &atom_date(item.pub_date))?;
        xml.start("summary", &[("type", "html")])?;
        xml.text(&item.description)?;
        xml.end("summary")?;
        xml.end("entry")?;
    }

    xml.end("feed")?;
    xml.finish()
}

fn atom_date(ts: djumblelog_core::types::Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Writer helpers
// ---------------------------------------------------------------------------

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Result<Self, FeedWriteError> {
        let mut out = Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        out.emit(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(out)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), FeedWriteError> {
        self.writer
            .write_event(event)
            .map_err(|e| FeedWriteError(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), FeedWriteError> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.emit(Event::Start(tag))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), FeedWriteError> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.emit(Event::Empty(tag))
    }

    fn end(&mut self, name: &str) -> Result<(), FeedWriteError> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<(), FeedWriteError> {
        self.emit(Event::Text(BytesText::new(text)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), FeedWriteError> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    fn finish(self) -> Result<String, FeedWriteError> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| FeedWriteError(e.to_string()))
    }
}
