//! Book repository
//!
//! - list: one query over `books`, newest first
//! - get: one LEFT JOIN over `books`/`chapters`, aggregated into a nested
//!   book (no N+1)
//!
//! The repository is built from a [`BookStore`], or from nothing at all in
//! degraded mode, where every call fails with [`DbError::Unavailable`].

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::rows::{aggregate, BookChapterRow, BookRow};
use crate::models::Book;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database connection is not available")]
    Unavailable,

    #[error("database error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

/// Row source behind a [`BookRepo`].
///
/// Implementations return raw rows; ordering is part of the contract:
/// `list_books` newest first by `created_at`, `book_rows` ascending by
/// chapter `order_num`.
#[async_trait]
pub trait BookStore: Send + Sync + 'static {
    async fn list_books(&self) -> Result<Vec<BookRow>, sqlx::Error>;

    /// LEFT JOIN rows for one book. Empty when the book does not exist.
    async fn book_rows(&self, id: &str) -> Result<Vec<BookChapterRow>, sqlx::Error>;
}

/// Book repository
#[derive(Clone, Default)]
pub struct BookRepo {
    store: Option<Arc<dyn BookStore>>,
}

impl BookRepo {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Repository with no backend (degraded mode).
    pub fn unavailable() -> Self {
        Self { store: None }
    }

    /// Postgres-backed repository, or degraded mode without a pool.
    pub fn from_pool(pool: Option<PgPool>) -> Self {
        match pool {
            Some(pool) => Self::new(Arc::new(PgBookStore::new(pool))),
            None => Self::unavailable(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&dyn BookStore, DbError> {
        self.store.as_deref().ok_or(DbError::Unavailable)
    }

    /// List all books, newest first, without chapters.
    ///
    /// An empty catalog is `Ok(vec![])`.
    pub async fn list_books(&self) -> Result<Vec<Book>, DbError> {
        let rows = self.store()?.list_books().await?;
        tracing::debug!(count = rows.len(), "listed books");
        Ok(rows.into_iter().map(BookRow::into_book).collect())
    }

    /// Get one book with its chapters ordered by `order_num`.
    pub async fn get_book_with_chapters(&self, id: &str) -> Result<Book, DbError> {
        let rows = self.store()?.book_rows(id).await?;
        aggregate(rows).ok_or_else(|| DbError::NotFound {
            resource: "book",
            id: id.to_owned(),
        })
    }
}

/// [`BookStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list_books(&self) -> Result<Vec<BookRow>, sqlx::Error> {
        sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author, description, cover_url, year, created_at, updated_at
            FROM books
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn book_rows(&self, id: &str) -> Result<Vec<BookChapterRow>, sqlx::Error> {
        // Ties on order_num fall back to creation order, then id
        sqlx::query_as::<_, BookChapterRow>(
            r#"
            SELECT
                b.id, b.title, b.author, b.description, b.cover_url, b.year,
                b.created_at, b.updated_at,
                c.id AS chapter_id,
                c.title AS chapter_title,
                c.summary AS chapter_summary,
                c.audio_url AS chapter_audio_url,
                c.order_num AS chapter_order_num,
                c.created_at AS chapter_created_at
            FROM books b
            LEFT JOIN chapters c ON c.book_id = b.id
            WHERE b.id = $1
            ORDER BY c.order_num ASC, c.created_at ASC, c.id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
    }
}
