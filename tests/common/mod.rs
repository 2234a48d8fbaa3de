//! Shared PostgreSQL fixture for integration tests.

use shelf_kernel::settings::Settings;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Stable prefix for Docker/container startup failures.
/// Only errors carrying it cause a skip; anything else panics.
pub const POSTGRES_CONTAINER_START_ERR_PREFIX: &str = "postgres-container-start:";

/// Schema application against a shared external database happens once per test binary.
static EXTERNAL_SCHEMA: OnceCell<()> = OnceCell::const_new();

/// A migrated database for one test.
///
/// By default a throwaway `postgres:16-alpine` container is started and removed on drop.
/// `SHELF_TEST_DATABASE_URL` points the tests at an existing database instead.
pub struct PostgresTestDb {
    pub pool: PgPool,
    _container: Option<ContainerAsync<Postgres>>,
}

impl PostgresTestDb {
    pub async fn new() -> anyhow::Result<Self> {
        if let Ok(url) = std::env::var("SHELF_TEST_DATABASE_URL") {
            let pool = pool_for(&url)?;
            EXTERNAL_SCHEMA
                .get_or_try_init(|| async { migrate(&pool).await })
                .await?;
            return Ok(Self {
                pool,
                _container: None,
            });
        }

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "{} failed to start PostgreSQL container: {e}",
                    POSTGRES_CONTAINER_START_ERR_PREFIX
                )
            })?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432).await?;

        // Default credentials from testcontainers-modules postgres
        let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");
        let pool = pool_for(&url)?;
        migrate(&pool).await?;

        Ok(Self {
            pool,
            _container: Some(container),
        })
    }
}

fn pool_for(url: &str) -> anyhow::Result<PgPool> {
    let mut settings = Settings::default();
    settings.database.url = url.to_string();
    settings.database.max_connections = 2;
    settings.database.connect_timeout_secs = 10;
    shelf_db::connect_lazy(&settings.database)
}

async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    let app = shelf_app::bootstrap::assemble_offline(&Settings::default())?;
    shelf_db::apply_migrations(pool, &app.registry.collect_migrations()).await
}

/// Try to create a test database, skipping if Docker is unavailable or
/// SKIP_POSTGRES_TESTS is set.
///
/// Schema, migration, or connection errors still panic so real regressions
/// are not silently swallowed.
pub async fn postgres_or_skip() -> Option<PostgresTestDb> {
    if std::env::var("SKIP_POSTGRES_TESTS").is_ok() {
        return None;
    }
    match PostgresTestDb::new().await {
        Ok(db) => Some(db),
        Err(err) => {
            let msg = format!("{err:#}");
            if msg.contains(POSTGRES_CONTAINER_START_ERR_PREFIX) {
                eprintln!("Skipping PostgreSQL test (Docker unavailable): {msg}");
                None
            } else {
                panic!("PostgreSQL test setup failed: {msg}");
            }
        }
    }
}
