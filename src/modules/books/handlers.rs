use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use shelf_http::{
    extract::{PathId, ValidJson},
    AppError,
};

use super::models::{Book, BookChanges, BookEnvelope, BookList, NewBook};
use super::store::BookStore;

/// Shared handler state: the store this API generation serves.
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn BookStore>,
}

impl BooksState {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

pub async fn list_books(State(state): State<BooksState>) -> Result<Json<BookList>, AppError> {
    let books = state.store.list().await?;
    Ok(Json(BookList { books }))
}

pub async fn get_book(
    State(state): State<BooksState>,
    PathId(id): PathId,
) -> Result<Json<BookEnvelope>, AppError> {
    let book = state.store.get(id).await?;
    Ok(Json(BookEnvelope { book }))
}

pub async fn create_book(
    State(state): State<BooksState>,
    ValidJson(new_book): ValidJson<NewBook>,
) -> Result<(StatusCode, Json<BookEnvelope>), AppError> {
    let book = state.store.create(new_book).await?;
    tracing::info!(book_id = book.id, "book created");
    Ok((StatusCode::CREATED, Json(BookEnvelope { book })))
}

pub async fn replace_book(
    State(state): State<BooksState>,
    PathId(id): PathId,
    ValidJson(new_book): ValidJson<NewBook>,
) -> Result<Json<Book>, AppError> {
    let book = state.store.replace(id, new_book).await?;
    Ok(Json(book))
}

pub async fn patch_book(
    State(state): State<BooksState>,
    PathId(id): PathId,
    ValidJson(changes): ValidJson<BookChanges>,
) -> Result<Json<Book>, AppError> {
    let book = state.store.patch(id, changes).await?;
    Ok(Json(book))
}

pub async fn delete_book(
    State(state): State<BooksState>,
    PathId(id): PathId,
) -> Result<Json<Book>, AppError> {
    let book = state.store.delete(id).await?;
    tracing::info!(book_id = book.id, "book deleted");
    Ok(Json(book))
}
