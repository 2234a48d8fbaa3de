//! Postgres connectivity: pool construction, a liveness probe, and schema application.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use shelf_kernel::{settings::DatabaseSettings, Migration};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Build a pool without opening a connection.
///
/// Connections are established on first use, so the server can start while the
/// database is still unreachable.
pub fn connect_lazy(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::from_str(&settings.url)
        .context("invalid database url")?;

    tracing::info!(
        target: "shelf-db",
        host = options.get_host(),
        port = options.get_port(),
        database = options.get_database().unwrap_or("<default>"),
        max_connections = settings.max_connections,
        "configuring PostgreSQL pool"
    );

    let max_lifetime = match settings.max_lifetime_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    Ok(PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .idle_timeout(Some(Duration::from_secs(settings.idle_timeout_secs)))
        .max_lifetime(max_lifetime)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .connect_lazy_with(options))
}

/// Run `SELECT 1`, logging the outcome. Never fails.
pub async fn check_connection(pool: &PgPool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => {
            tracing::info!(target: "shelf-db", "database connected");
            true
        }
        Err(err) => {
            tracing::error!(target: "shelf-db", error = %err, "database connection failed");
            false
        }
    }
}

/// Split a schema script into executable statements, dropping comment-only chunks.
fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// Apply migrations in order. Scripts must be idempotent; they run on every startup.
pub async fn apply_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<()> {
    for (module, migration) in migrations {
        for statement in schema_statements(migration.up) {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| {
                    format!("migration '{}' from module '{}' failed", migration.id, module)
                })?;
        }
        tracing::info!(
            target: "shelf-db",
            module = %module,
            migration = migration.id,
            "migration applied"
        );
    }

    Ok(())
}
