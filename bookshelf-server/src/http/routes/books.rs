//! Book endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::Book;

/// GET /api/books - all books, newest first, chapters omitted
async fn list_books(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state.books.list_books().await?;
    Ok(Json(books))
}

/// GET /api/books/{id} - one book with its ordered chapters
async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let book = state.books.get_book_with_chapters(&id).await?;
    tracing::debug!(book_id = %book.id, chapters = book.chapters().len(), "fetched book");
    Ok(Json(book))
}

/// Book routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/books", get(list_books))
        .route("/api/books/{id}", get(get_book))
}
