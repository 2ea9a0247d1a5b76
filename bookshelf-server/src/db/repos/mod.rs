//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for nested reads (no N+1)
//! - Fails fast with `Unavailable` when no database is configured
//! - Never retries; errors go straight back to the caller

pub mod books;
pub mod memory;

pub use books::{BookRepo, BookStore, DbError, PgBookStore};
pub use memory::{MemoryBookStore, StoredChapter};
