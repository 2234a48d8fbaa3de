use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// A catalogue record as returned by either store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier, never reused
    #[schema(example = 1)]
    pub id: i64,
    /// Title of the book
    #[schema(example = "Happiness Inside")]
    pub title: String,
    /// Price in minor currency units
    #[schema(example = 50000)]
    pub price: i64,
    /// Short description of the book
    #[schema(example = "A quiet meditation on finding joy in ordinary days.")]
    pub summary: String,
    /// Creation time; only present for the persistent catalogue
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<OffsetDateTime>,
    /// Last modification time; only present for the persistent catalogue
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// Response body for `GET` on the collection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookList {
    pub books: Vec<Book>,
}

/// Response body wrapping a single book for `GET /{id}` and `POST`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookEnvelope {
    pub book: Book,
}

/// Validated field set for create and full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub price: i64,
    pub summary: String,
}

/// Validated partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub price: Option<i64>,
    pub summary: Option<String>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.price.is_none() && self.summary.is_none()
    }

    /// Merge onto an existing record; supplied fields win.
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(summary) = self.summary {
            book.summary = summary;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        Book {
            id: 7,
            title: "Original".to_string(),
            price: 100,
            summary: "An original summary".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn changes_merge_only_present_fields() {
        let mut target = book();
        BookChanges {
            price: Some(250),
            ..Default::default()
        }
        .apply_to(&mut target);

        assert_eq!(target.price, 250);
        assert_eq!(target.title, "Original");
        assert_eq!(target.summary, "An original summary");
        assert_eq!(target.id, 7);
    }

    #[test]
    fn empty_changes_are_a_no_op() {
        let changes = BookChanges::default();
        assert!(changes.is_empty());

        let mut target = book();
        changes.apply_to(&mut target);
        assert_eq!(target, book());
    }

    #[test]
    fn timestamps_are_omitted_for_memory_records() {
        let value = serde_json::to_value(book()).unwrap();
        assert!(value.get("created_at").is_none());
        assert!(value.get("updated_at").is_none());
        assert_eq!(value["summary"], "An original summary");
    }

    #[test]
    fn timestamps_render_as_rfc3339() {
        let mut record = book();
        record.created_at = Some(time::macros::datetime!(2024-05-01 12:00:00 UTC));
        record.updated_at = record.created_at;

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["created_at"], "2024-05-01T12:00:00Z");

        let back: Book = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
