use async_trait::async_trait;
use sqlx::PgPool;

use super::{BookStore, StoreError, StoreResult};
use crate::modules::books::models::{Book, BookChanges, NewBook};

const SELECT_ALL: &str = "SELECT id, title, price, summary, created_at, updated_at \
     FROM books ORDER BY id";

const SELECT_ONE: &str = "SELECT id, title, price, summary, created_at, updated_at \
     FROM books WHERE id = $1";

const INSERT: &str = "INSERT INTO books (title, price, summary) VALUES ($1, $2, $3) \
     RETURNING id, title, price, summary, created_at, updated_at";

// `updated_at` moves strictly forward even when two writes share a clock tick.
const REPLACE: &str = "UPDATE books \
     SET title = $2, price = $3, summary = $4, \
         updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond') \
     WHERE id = $1 \
     RETURNING id, title, price, summary, created_at, updated_at";

const PATCH: &str = "UPDATE books \
     SET title = COALESCE($2, title), \
         price = COALESCE($3, price), \
         summary = COALESCE($4, summary), \
         updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond') \
     WHERE id = $1 \
     RETURNING id, title, price, summary, created_at, updated_at";

const DELETE: &str = "DELETE FROM books WHERE id = $1 \
     RETURNING id, title, price, summary, created_at, updated_at";

/// Persistent catalogue backed by the `books` table.
///
/// Each operation is a single statement, so it is atomic on its own; no transaction spans
/// more than one statement.
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
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get(&self, id: i64) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(SELECT_ONE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, book: NewBook) -> StoreResult<Book> {
        let created = sqlx::query_as::<_, Book>(INSERT)
            .bind(book.title)
            .bind(book.price)
            .bind(book.summary)
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!(book_id = created.id, "book inserted");
        Ok(created)
    }

    async fn replace(&self, id: i64, book: NewBook) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(REPLACE)
            .bind(id)
            .bind(book.title)
            .bind(book.price)
            .bind(book.summary)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn patch(&self, id: i64, changes: BookChanges) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(PATCH)
            .bind(id)
            .bind(changes.title)
            .bind(changes.price)
            .bind(changes.summary)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(DELETE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }
}
