pub mod books;

use std::sync::Arc;

use shelf_authz::BearerGuard;
use shelf_kernel::{settings::Settings, ModuleRegistry};
use sqlx::PgPool;

use books::store::{BookStore, MemoryBookStore, PgBookStore};
use books::Generation;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    pool: PgPool,
    guard: BearerGuard,
) {
    let memory: Arc<dyn BookStore> = if settings.books.seed_memory {
        Arc::new(MemoryBookStore::seeded())
    } else {
        Arc::new(MemoryBookStore::new())
    };
    let persistent: Arc<dyn BookStore> = Arc::new(PgBookStore::new(pool));

    registry.register(books::create_module(Generation::V1, memory, guard.clone()));
    registry.register(books::create_module(Generation::V2, persistent, guard));
}
