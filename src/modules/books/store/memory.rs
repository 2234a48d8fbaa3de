use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError, StoreResult};
use crate::modules::books::models::{Book, BookChanges, NewBook};

struct Catalogue {
    books: BTreeMap<i64, Book>,
    next_id: i64,
}

impl Catalogue {
    fn insert(&mut self, book: NewBook) -> Book {
        let record = Book {
            id: self.next_id,
            title: book.title,
            price: book.price,
            summary: book.summary,
            created_at: None,
            updated_at: None,
        };
        self.next_id += 1;
        self.books.insert(record.id, record.clone());
        record
    }
}

/// Non-durable catalogue held in process memory.
///
/// Writers are serialized by the lock, so a patch's read-modify-write cannot interleave
/// with another writer. Ids come from a counter that only moves forward.
pub struct MemoryBookStore {
    inner: RwLock<Catalogue>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Catalogue {
                books: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Store pre-populated with `books`, ids assigned from 1 in order.
    pub fn with_books(books: impl IntoIterator<Item = NewBook>) -> Self {
        let mut catalogue = Catalogue {
            books: BTreeMap::new(),
            next_id: 1,
        };
        for book in books {
            catalogue.insert(book);
        }
        Self {
            inner: RwLock::new(catalogue),
        }
    }

    /// Store holding the sample catalogue.
    pub fn seeded() -> Self {
        Self::with_books(sample_books())
    }
}

impl Default for MemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_books() -> Vec<NewBook> {
    vec![
        NewBook {
            title: "Atomic Habits".to_string(),
            price: 20000,
            summary: "Small, consistent changes compound into remarkable results over time."
                .to_string(),
        },
        NewBook {
            title: "The Go Concurrency".to_string(),
            price: 35000,
            summary: "Goroutines, channels and the patterns that keep concurrent programs sane."
                .to_string(),
        },
        NewBook {
            title: "Postgres The Relational".to_string(),
            price: 50000,
            summary: "A practical tour of relational modelling, indexing and query planning."
                .to_string(),
        },
    ]
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let catalogue = self.inner.read().await;
        Ok(catalogue.books.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> StoreResult<Book> {
        let catalogue = self.inner.read().await;
        catalogue
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, book: NewBook) -> StoreResult<Book> {
        let mut catalogue = self.inner.write().await;
        Ok(catalogue.insert(book))
    }

    async fn replace(&self, id: i64, book: NewBook) -> StoreResult<Book> {
        let mut catalogue = self.inner.write().await;
        let record = catalogue
            .books
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        record.title = book.title;
        record.price = book.price;
        record.summary = book.summary;
        Ok(record.clone())
    }

    async fn patch(&self, id: i64, changes: BookChanges) -> StoreResult<Book> {
        let mut catalogue = self.inner.write().await;
        let record = catalogue
            .books
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        changes.apply_to(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<Book> {
        let mut catalogue = self.inner.write().await;
        catalogue.books.remove(&id).ok_or(StoreError::NotFound(id))
    }
}
