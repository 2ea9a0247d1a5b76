//! Book and chapter entities
//!
//! Field names serialize in camelCase (`coverUrl`, `orderNum`, ...), which is
//! the JSON contract existing clients depend on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog book.
///
/// `chapters` is only populated by the single-book view. The list view leaves
/// it as `None`, and it is then omitted from the JSON entirely. A book that
/// exists but has no chapters carries `Some(vec![])`, which serializes as `[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    /// Four-character publication year, stored as text.
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<Chapter>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Chapters as a slice, empty for list-view books.
    pub fn chapters(&self) -> &[Chapter] {
        self.chapters.as_deref().unwrap_or(&[])
    }
}

/// A chapter belonging to exactly one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub book_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub audio_url: Option<String>,
    /// Sort position within the book. Not unique.
    pub order_num: i32,
    pub created_at: Option<DateTime<Utc>>,
}
