//! Content type identifiers.
//!
//! A [`ContentType`] names one kind of trackable source record as
//! `app_label.model` (e.g. `blog.post`). It is the type half of the
//! polymorphic `(type, id)` reference stored on every journal entry, and it
//! determines the per-type template names consulted by the render resolver.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Valid `app_label` / `model` segment: lowercase identifier.
static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid regex"));

/// A source type identifier of the form `app_label.model`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentType {
    app_label: String,
    model: String,
}

impl ContentType {
    /// Build a content type from its two segments.
    ///
    /// Segments are lowercased before validation, so `Blog.Post` and
    /// `blog.post` name the same type.
    pub fn new(app_label: &str, model: &str) -> Result<Self, CoreError> {
        let app_label = app_label.trim().to_lowercase();
        let model = model.trim().to_lowercase();

        for (what, value) in [("app label", &app_label), ("model", &model)] {
            if !SEGMENT_RE.is_match(value) {
                return Err(CoreError::Validation(format!(
                    "Invalid {what} '{value}' in content type identifier"
                )));
            }
        }

        Ok(Self { app_label, model })
    }

    /// Parse an `app_label.model` identifier.
    pub fn parse(identifier: &str) -> Result<Self, CoreError> {
        match identifier.split_once('.') {
            Some((app_label, model)) if !model.contains('.') => Self::new(app_label, model),
            _ => Err(CoreError::Validation(format!(
                "Content type identifier '{identifier}' must have the form app_label.model"
            ))),
        }
    }

    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The canonical `app_label.model` string stored in `entries.source_type`.
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.app_label, self.model)
    }

    /// Name of the per-type template for a field, e.g. `blog/post_title.html`.
    pub fn template_name(&self, suffix: &str) -> String {
        format!("{}/{}_{suffix}.html", self.app_label, self.model)
    }

    /// Human-facing type name: `blog.link_post` becomes `LinkPost`.
    pub fn class_name(&self) -> String {
        self.model
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model)
    }
}

impl FromStr for ContentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_identifier() {
        let ct = ContentType::parse("Blog.Post").unwrap();
        assert_eq!(ct.app_label(), "blog");
        assert_eq!(ct.model(), "post");
        assert_eq!(ct.identifier(), "blog.post");
        assert_eq!(ct.to_string(), "blog.post");
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for bad in ["blog", "blog.", ".post", "blog.post.extra", "blog.po st", "1blog.post"] {
            assert!(ContentType::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn derives_template_names() {
        let ct = ContentType::parse("blog.post").unwrap();
        assert_eq!(ct.template_name("title"), "blog/post_title.html");
        assert_eq!(ct.template_name("render"), "blog/post_render.html");
    }

    #[test]
    fn class_name_is_camel_cased() {
        assert_eq!(ContentType::parse("blog.post").unwrap().class_name(), "Post");
        assert_eq!(
            ContentType::parse("links.link_post").unwrap().class_name(),
            "LinkPost"
        );
    }

    #[test]
    fn serializes_as_identifier_string() {
        let ct = ContentType::parse("blog.post").unwrap();
        assert_eq!(serde_json::to_value(&ct).unwrap(), "blog.post");
        let back: ContentType = serde_json::from_value(serde_json::json!("blog.post")).unwrap();
        assert_eq!(back, ct);
    }
}
