//! Request extractors that turn raw path segments and JSON bodies into validated values.
//!
//! Every failure is reported as [`AppError::Validation`] so callers see a 400 with a
//! `details` list instead of axum's default plain-text rejections.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use garde::Validate;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::AppError;

/// Longest raw path value echoed back in a validation detail.
const MAX_ECHOED_VALUE_LEN: usize = 64;

/// A request payload with declared constraints.
///
/// `Input` is the wire shape carrying the `garde` rules; `from_input` is only called once
/// those rules pass, so it can rely on them (required fields present, bounds respected).
pub trait Payload: Sized {
    type Input: DeserializeOwned + garde::Validate<Context = ()>;

    fn from_input(input: Self::Input) -> Self;
}

/// JSON body extractor that deserializes `T::Input`, validates it, and yields `T`.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Payload,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(input) = Json::<T::Input>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::validation(
                    vec![json!({ "field": "body", "error": rejection.body_text() })],
                    "Request body is not valid JSON for this operation",
                )
            })?;

        input.validate().map_err(report_to_error)?;

        Ok(ValidJson(T::from_input(input)))
    }
}

/// Convert every violation in a `garde` report into a `{field, error}` detail.
pub fn report_to_error(report: garde::Report) -> AppError {
    let details = report
        .iter()
        .map(|(path, error)| json!({ "field": path.to_string(), "error": error.message() }))
        .collect();
    AppError::validation(details, "Request validation failed")
}

/// Integer resource identifier taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::validation(
                    vec![json!({ "field": "id", "error": rejection.body_text() })],
                    "Missing resource identifier",
                )
            })?;

        parse_id(&raw).map(PathId)
    }
}

/// Plain decimal only: an optional `-` followed by ASCII digits. `+1`, ` 1` and `1e3` are
/// rejected so every id has exactly one spelling.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let canonical = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());

    canonical
        .then(|| raw.parse::<i64>().ok())
        .flatten()
        .ok_or_else(|| {
            let shown: String = raw.chars().take(MAX_ECHOED_VALUE_LEN).collect();
            AppError::validation(
                vec![json!({ "field": "id", "error": "must be an integer", "value": shown })],
                "Invalid resource identifier",
            )
        })
}
