//! PostgreSQL store integration tests using testcontainers.
//!
//! Each test gets a fresh `postgres:16-alpine` container, so Docker must be running.
//! Set SHELF_TEST_DATABASE_URL to use an existing database instead (tests then share
//! the `books` table and only assert on rows they created), or SKIP_POSTGRES_TESTS=1
//! to skip.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use shelf_app::modules::books::models::{BookChanges, NewBook};
use shelf_app::modules::books::store::{BookStore, PgBookStore, StoreError};
use shelf_app::modules::books::{self, Generation};
use shelf_authz::BearerGuard;
use shelf_kernel::{settings::Settings, ModuleRegistry};
use tower::ServiceExt;

use common::postgres_or_skip;

fn new_book(title: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        price: 45000,
        summary: "A thrilling journey through the unknown lands of testing.".to_string(),
    }
}

#[tokio::test]
async fn test_postgres_book_lifecycle() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let store = PgBookStore::new(db.pool.clone());

    let created = store.create(new_book("Lifecycle Book")).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.title, "Lifecycle Book");
    let created_at = created.created_at.expect("created_at populated");
    let updated_at = created.updated_at.expect("updated_at populated");
    assert!(updated_at >= created_at);

    let fetched = store.get(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let listed = store.list().await.unwrap();
    assert!(listed.iter().any(|b| b.id == created.id));
    assert!(listed.windows(2).all(|w| w[0].id < w[1].id));

    let patched = store
        .patch(
            created.id,
            BookChanges {
                price: Some(55000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.price, 55000);
    assert_eq!(patched.title, created.title);
    assert_eq!(patched.summary, created.summary);
    assert_eq!(patched.created_at, created.created_at);

    let deleted = store.delete(created.id).await.unwrap();
    assert_eq!(deleted.id, created.id);
    assert_eq!(deleted.price, 55000);

    assert!(matches!(
        store.get(created.id).await,
        Err(StoreError::NotFound(id)) if id == created.id
    ));
    assert!(matches!(
        store.delete(created.id).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_postgres_ids_are_never_reused() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let store = PgBookStore::new(db.pool.clone());

    let first = store.create(new_book("First Book")).await.unwrap();
    let second = store.create(new_book("Second Book")).await.unwrap();
    assert!(second.id > first.id);

    store.delete(second.id).await.unwrap();
    let third = store.create(new_book("Third Book")).await.unwrap();
    assert!(third.id > second.id);

    store.delete(first.id).await.unwrap();
    store.delete(third.id).await.unwrap();
}

#[tokio::test]
async fn test_postgres_replace_overwrites_and_advances_timestamp() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let store = PgBookStore::new(db.pool.clone());

    let created = store.create(new_book("Replace Me")).await.unwrap();
    let replaced = store
        .replace(
            created.id,
            NewBook {
                title: "Replaced Title".to_string(),
                price: 1,
                summary: "An entirely different summary text.".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.title, "Replaced Title");
    assert_eq!(replaced.price, 1);
    assert_eq!(replaced.summary, "An entirely different summary text.");
    assert_eq!(replaced.created_at, created.created_at);
    assert!(replaced.updated_at > created.updated_at);

    store.delete(created.id).await.unwrap();
}

#[tokio::test]
async fn test_postgres_empty_patch_still_touches_updated_at() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let store = PgBookStore::new(db.pool.clone());

    let created = store.create(new_book("Touch Me")).await.unwrap();
    let first = store
        .patch(created.id, BookChanges::default())
        .await
        .unwrap();
    let second = store
        .patch(created.id, BookChanges::default())
        .await
        .unwrap();

    assert_eq!(first.title, created.title);
    assert_eq!(first.price, created.price);
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);

    store.delete(created.id).await.unwrap();
}

#[tokio::test]
async fn test_postgres_unknown_id_is_not_found() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let store = PgBookStore::new(db.pool.clone());
    let missing = i64::MAX;

    assert!(matches!(store.get(missing).await, Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.replace(missing, new_book("Nobody Home")).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.patch(missing, BookChanges::default()).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.delete(missing).await, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_postgres_schema_is_idempotent() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };

    // A second application of the same scripts must be a no-op.
    let app = shelf_app::bootstrap::assemble_offline(&Settings::default()).unwrap();
    shelf_db::apply_migrations(&db.pool, &app.registry.collect_migrations())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_postgres_rejects_out_of_range_rows() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };

    let result = sqlx::query("INSERT INTO books (title, price, summary) VALUES ($1, $2, $3)")
        .bind("Ab")
        .bind(0_i64)
        .bind("short")
        .execute(&db.pool)
        .await;
    assert!(result.is_err());
}

// =============================================================================
// Persistent generation through the router
// =============================================================================

const TOKEN: &str = "test-token";
const V2: &str = "/api/v2/books";

fn v2_router(store: PgBookStore) -> axum::Router {
    let mut registry = ModuleRegistry::new();
    registry.register(books::create_module(
        Generation::V2,
        Arc::new(store),
        BearerGuard::new(TOKEN).unwrap(),
    ));
    shelf_http::build_router(&registry, &Settings::default())
}

async fn post(router: &axum::Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(V2)
        .header("Authorization", format!("Bearer {TOKEN}"))
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_postgres_create_over_http_carries_timestamps() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let router = v2_router(PgBookStore::new(db.pool.clone()));

    let (status, body) = post(
        &router,
        json!({
            "title": "The Great Adventure",
            "price": 45000,
            "summary": "A thrilling journey through the unknown lands of testing."
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["book"]["created_at"].is_string());
    assert!(body["book"]["updated_at"].is_string());
}

#[tokio::test]
async fn test_postgres_nul_text_is_bad_request_like_memory() {
    let Some(db) = postgres_or_skip().await else {
        return;
    };
    let router = v2_router(PgBookStore::new(db.pool.clone()));

    let (status, body) = post(
        &router,
        json!({ "title": "a\0b", "price": 1, "summary": "0123456789" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "title");
}
