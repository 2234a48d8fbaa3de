//! Declared request shapes for the books endpoints.
//!
//! Bounds: title 3..=50 chars, price >= 1, summary 10..=200 chars. Text must not contain
//! NUL, which Postgres cannot store. Create and replace require every field; patch accepts
//! any subset and checks whatever is present.

use garde::Validate;
use serde::Deserialize;
use shelf_http::extract::Payload;
use utoipa::ToSchema;

use super::models::{BookChanges, NewBook};

/// Body of `POST` and `PUT`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(as = CreateBook)]
pub struct BookInput {
    #[garde(required, length(chars, min = 3, max = 50), custom(no_nul))]
    #[schema(value_type = String, required = true, min_length = 3, max_length = 50, example = "Happiness Inside")]
    pub title: Option<String>,

    #[garde(required, range(min = 1))]
    #[schema(value_type = i64, required = true, minimum = 1, example = 50000)]
    pub price: Option<i64>,

    #[garde(required, length(chars, min = 10, max = 200), custom(no_nul))]
    #[schema(
        value_type = String,
        required = true,
        min_length = 10,
        max_length = 200,
        example = "A quiet meditation on finding joy in ordinary days."
    )]
    pub summary: Option<String>,
}

/// Body of `PATCH`; every field optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[schema(as = UpdateBook)]
pub struct BookPatchInput {
    #[garde(length(chars, min = 3, max = 50), custom(no_nul))]
    #[schema(min_length = 3, max_length = 50)]
    pub title: Option<String>,

    #[garde(range(min = 1))]
    #[schema(minimum = 1)]
    pub price: Option<i64>,

    #[garde(length(chars, min = 10, max = 200), custom(no_nul))]
    #[schema(min_length = 10, max_length = 200)]
    pub summary: Option<String>,
}

fn no_nul(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(text) if text.contains('\0') => {
            Err(garde::Error::new("must not contain NUL characters"))
        }
        _ => Ok(()),
    }
}

impl Payload for NewBook {
    type Input = BookInput;

    // `required` has already rejected absent fields.
    fn from_input(input: BookInput) -> Self {
        NewBook {
            title: input.title.unwrap_or_default(),
            price: input.price.unwrap_or_default(),
            summary: input.summary.unwrap_or_default(),
        }
    }
}

impl Payload for BookChanges {
    type Input = BookPatchInput;

    fn from_input(input: BookPatchInput) -> Self {
        BookChanges {
            title: input.title,
            price: input.price,
            summary: input.summary,
        }
    }
}
