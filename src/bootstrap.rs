//! Process bootstrap shared by the `shelf-app` binary and the CLI.

use anyhow::Context;
use shelf_authz::BearerGuard;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::PgPool;

use crate::modules;

/// Everything needed to serve or introspect the API.
pub struct Application {
    pub registry: ModuleRegistry,
    pub pool: PgPool,
}

/// Build the pool and register every module behind `guard`.
///
/// The pool is lazy, so this succeeds without a reachable database.
pub fn assemble(settings: &Settings, guard: BearerGuard) -> anyhow::Result<Application> {
    let pool = shelf_db::connect_lazy(&settings.database)
        .context("failed to configure database pool")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, pool.clone(), guard);

    Ok(Application { registry, pool })
}

/// Assemble modules for introspection only; every route rejects all callers.
pub fn assemble_offline(settings: &Settings) -> anyhow::Result<Application> {
    assemble(settings, BearerGuard::deny_all())
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        "shelf-app bootstrap starting"
    );

    let token = settings
        .auth
        .require_token()
        .context("refusing to start without a bearer token")?;
    let guard = BearerGuard::new(token)?;
    let app = assemble(&settings, guard)?;

    // A missing database degrades the persistent API only; the server still starts.
    let database_ready = shelf_db::check_connection(&app.pool).await;
    if database_ready && settings.database.migrate_on_startup {
        let migrations = app.registry.collect_migrations();
        if let Err(err) = shelf_db::apply_migrations(&app.pool, &migrations).await {
            tracing::error!(error = ?err, "schema migration failed");
        }
    }

    let ctx = InitCtx {
        settings: &settings,
        database_ready,
    };
    app.registry.init_modules(&ctx).await?;
    app.registry.start_modules(&ctx).await?;

    tracing::info!("shelf-app bootstrap complete");

    let served = shelf_http::start_server(&app.registry, &settings).await;

    app.registry.stop_modules().await?;
    app.pool.close().await;

    served
}

/// Apply every module migration, failing on the first error.
pub async fn migrate(settings: &Settings) -> anyhow::Result<()> {
    let app = assemble_offline(settings)?;
    let migrations = app.registry.collect_migrations();

    tracing::info!(count = migrations.len(), "applying migrations");
    shelf_db::apply_migrations(&app.pool, &migrations).await?;

    app.pool.close().await;
    Ok(())
}

/// The merged OpenAPI document for every registered module.
pub fn openapi(settings: &Settings) -> anyhow::Result<serde_json::Value> {
    let app = assemble_offline(settings)?;
    Ok(shelf_http::router::openapi_document(&app.registry))
}
