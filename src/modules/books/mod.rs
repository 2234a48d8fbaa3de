pub mod handlers;
pub mod models;
pub mod openapi;
pub mod schema;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{middleware, routing::get, Router};
use shelf_authz::{require_bearer, BearerGuard};
use shelf_kernel::{InitCtx, Migration, Module};

use handlers::BooksState;
use store::BookStore;

/// Idempotent DDL for the persistent catalogue.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Which API generation a books module serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// `/api/v1/books`, non-durable in-memory catalogue
    V1,
    /// `/api/v2/books`, Postgres-backed catalogue with timestamps
    V2,
}

impl Generation {
    fn module_name(self) -> &'static str {
        match self {
            Generation::V1 => "books-v1",
            Generation::V2 => "books-v2",
        }
    }

    fn base_path(self) -> &'static str {
        match self {
            Generation::V1 => "/api/v1/books",
            Generation::V2 => "/api/v2/books",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Generation::V1 => "Books v1",
            Generation::V2 => "Books v2",
        }
    }
}

/// Books resource module; one instance per API generation.
pub struct BooksModule {
    generation: Generation,
    state: BooksState,
    guard: BearerGuard,
}

impl BooksModule {
    pub fn new(generation: Generation, store: Arc<dyn BookStore>, guard: BearerGuard) -> Self {
        Self {
            generation,
            state: BooksState::new(store),
            guard,
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        self.generation.module_name()
    }

    fn base_path(&self) -> String {
        self.generation.base_path().to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.generation == Generation::V2 && !ctx.database_ready {
            tracing::warn!(
                module = self.name(),
                "database unavailable; requests will fail until it is reachable"
            );
        }
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(handlers::list_books).post(handlers::create_book),
            )
            .route(
                "/{id}",
                get(handlers::get_book)
                    .put(handlers::replace_book)
                    .patch(handlers::patch_book)
                    .delete(handlers::delete_book),
            )
            .route_layer(middleware::from_fn_with_state(
                self.guard.clone(),
                require_bearer,
            ))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi::fragment(self.generation.tag()))
    }

    fn migrations(&self) -> Vec<Migration> {
        match self.generation {
            Generation::V1 => vec![],
            Generation::V2 => vec![Migration {
                id: "001_books",
                up: SCHEMA_SQL,
            }],
        }
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            base_path = self.generation.base_path(),
            "books module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a books module for `generation` backed by `store`
pub fn create_module(
    generation: Generation,
    store: Arc<dyn BookStore>,
    guard: BearerGuard,
) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(generation, store, guard))
}
