//! bookshelf-server: read-only HTTP catalog of books and chapters
//!
//! Serves `GET /health`, `GET /api/books` and `GET /api/books/{id}` from
//! PostgreSQL. Without a database URL the server still starts, and the data
//! routes answer 503.

pub mod db;
pub mod http;
pub mod models;

pub use db::{BookRepo, DbError};
pub use http::{run_server, ServerConfig};
pub use models::{Book, Chapter};
