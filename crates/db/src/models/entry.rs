//! Journal entry model.
//!
//! Entries are immutable once written: no `updated_at`, no update DTO.
//! Title, description and rendering are derived on read and never stored.

use djumblelog_core::content_type::ContentType;
use djumblelog_core::error::CoreError;
use djumblelog_core::source::SourceRef;
use djumblelog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `entries` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Entry {
    pub id: DbId,
    pub created_at: Timestamp,
    pub source_type: String,
    pub source_id: DbId,
}

impl Entry {
    /// Parse the stored `source_type` back into a content type.
    pub fn content_type(&self) -> Result<ContentType, CoreError> {
        ContentType::parse(&self.source_type)
    }

    /// The polymorphic reference to this entry's source record.
    pub fn source_ref(&self) -> Result<SourceRef, CoreError> {
        Ok(SourceRef::new(self.content_type()?, self.source_id))
    }

    /// Short label such as `Post: Hello world`.
    pub fn label(&self, display: &str) -> String {
        match self.content_type() {
            Ok(ct) => format!("{}: {display}", ct.class_name()),
            Err(_) => format!("{}: {display}", self.source_type),
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Requested ordering for per-type listings.
///
/// Parses the `created_at` / `-created_at` spelling used in query strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum EntryOrder {
    #[default]
    #[serde(rename = "-created_at")]
    NewestFirst,
    #[serde(rename = "created_at")]
    OldestFirst,
}

impl EntryOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "-created_at" => Some(Self::NewestFirst),
            "created_at" => Some(Self::OldestFirst),
            _ => None,
        }
    }

    /// SQL `ORDER BY` clause. Ties on `created_at` are broken by `id`.
    pub fn sql(self) -> &'static str {
        match self {
            Self::NewestFirst => "created_at DESC, id DESC",
            Self::OldestFirst => "created_at ASC, id ASC",
        }
    }
}
