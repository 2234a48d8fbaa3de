//! Books Store API
//!
//! Two API generations over the same resource contract: `/api/v1/books` keeps the
//! catalogue in memory, `/api/v2/books` persists it in Postgres.

pub mod bootstrap;
pub mod modules;

pub use modules::*;
