//! Static bearer-token guard for resource routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use shelf_http::AppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was turned away by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No `Authorization` header, or not of the form `Bearer <token>`
    Missing,
    /// Well-formed header carrying the wrong token
    Mismatch,
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Missing => AppError::unauthorized("Unauthorized"),
            Denial::Mismatch => AppError::unauthorized("Invalid token"),
        }
    }
}

/// Holds the process-wide shared secret.
#[derive(Clone)]
pub struct BearerGuard {
    token: Option<Arc<str>>,
}

impl BearerGuard {
    /// Build a guard; an empty secret would accept `Bearer ` and is refused.
    pub fn new(token: impl Into<Arc<str>>) -> anyhow::Result<Self> {
        let token = token.into();
        if token.is_empty() {
            anyhow::bail!("bearer token must not be empty");
        }
        Ok(Self { token: Some(token) })
    }

    /// Guard with no secret that rejects every request. Used when routes are assembled
    /// only for introspection (docs, migrations) and never served.
    pub fn deny_all() -> Self {
        Self { token: None }
    }

    /// Check a raw `Authorization` header value.
    pub fn check(&self, header: Option<&[u8]>) -> Result<(), Denial> {
        let presented = header
            .and_then(|value| value.strip_prefix(BEARER_PREFIX.as_bytes()))
            .ok_or(Denial::Missing)?;

        match &self.token {
            Some(token) if presented == token.as_bytes() => Ok(()),
            _ => Err(Denial::Mismatch),
        }
    }
}

impl std::fmt::Debug for BearerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerGuard").finish_non_exhaustive()
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn require_bearer(
    State(guard): State<BearerGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req.headers().get(AUTHORIZATION).map(|v| v.as_bytes());

    if let Err(denial) = guard.check(header) {
        tracing::debug!(
            method = %req.method(),
            path = %req.uri().path(),
            reason = ?denial,
            "request rejected by bearer guard"
        );
        return Err(denial.into());
    }

    Ok(next.run(req).await)
}
