//! In-memory [`BookStore`]
//!
//! Produces the same rows the Postgres queries would, including the LEFT
//! JOIN shape and the ordering rules, so the repository and HTTP layer can
//! be exercised without a database.

use std::cmp::Reverse;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::books::BookStore;
use crate::db::rows::{BookChapterRow, BookRow};

/// Chapter columns as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChapter {
    pub id: String,
    pub book_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub audio_url: Option<String>,
    pub order_num: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
}

/// Book store held in memory. Built once, then read-only.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookStore {
    books: Vec<BookRow>,
    chapters: Vec<StoredChapter>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(mut self, book: BookRow) -> Self {
        self.books.push(book);
        self
    }

    /// Add a chapter. Insertion order is the storage order used for ties.
    pub fn with_chapter(mut self, chapter: StoredChapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Make every query fail with a protocol error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Make every query take at least `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn check(&self) -> Result<(), sqlx::Error> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(sqlx::Error::Protocol(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list_books(&self) -> Result<Vec<BookRow>, sqlx::Error> {
        self.check().await?;
        let mut books = self.books.clone();
        // ORDER BY created_at DESC puts NULLs first, as Postgres does
        books.sort_by_key(|b| (b.created_at.is_some(), Reverse(b.created_at)));
        Ok(books)
    }

    async fn book_rows(&self, id: &str) -> Result<Vec<BookChapterRow>, sqlx::Error> {
        self.check().await?;
        let Some(book) = self.books.iter().find(|b| b.id == id) else {
            return Ok(Vec::new());
        };

        let mut chapters: Vec<&StoredChapter> =
            self.chapters.iter().filter(|c| c.book_id == id).collect();
        // ORDER BY order_num ASC puts NULLs last; the sort is stable
        chapters.sort_by_key(|c| (c.order_num.is_none(), c.order_num));

        if chapters.is_empty() {
            return Ok(vec![BookChapterRow::without_chapter(book.clone())]);
        }

        Ok(chapters
            .into_iter()
            .map(|c| BookChapterRow {
                book: book.clone(),
                chapter_id: Some(c.id.clone()),
                chapter_title: Some(c.title.clone()),
                chapter_summary: c.summary.clone(),
                chapter_audio_url: c.audio_url.clone(),
                chapter_order_num: c.order_num,
                chapter_created_at: c.created_at,
            })
            .collect())
    }
}
