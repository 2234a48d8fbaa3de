//! Book persistence behind a single contract with an in-memory and a Postgres backend.

mod memory;
mod postgres;

pub use memory::MemoryBookStore;
pub use postgres::PgBookStore;

use async_trait::async_trait;
use shelf_http::AppError;
use thiserror::Error;

use super::models::{Book, BookChanges, NewBook};

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::not_found("Book not found"),
            StoreError::Database(source) => {
                AppError::Internal(anyhow::Error::new(source).context("book store query failed"))
            }
        }
    }
}

/// Authoritative owner of the book collection.
///
/// Both implementations give callers the same observable behaviour: ids are assigned by
/// the store and never reused, `list` is ordered by ascending id, and every id-addressed
/// operation reports [`StoreError::NotFound`] for an unknown id.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, ascending by id
    async fn list(&self) -> StoreResult<Vec<Book>>;

    async fn get(&self, id: i64) -> StoreResult<Book>;

    /// Insert with a freshly assigned id
    async fn create(&self, book: NewBook) -> StoreResult<Book>;

    /// Overwrite every mutable field, keeping the id
    async fn replace(&self, id: i64, book: NewBook) -> StoreResult<Book>;

    /// Merge the supplied fields; an empty change set still counts as an update
    async fn patch(&self, id: i64, changes: BookChanges) -> StoreResult<Book>;

    /// Remove and return the final state
    async fn delete(&self, id: i64) -> StoreResult<Book>;
}
