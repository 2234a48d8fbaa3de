use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees during its lifecycle hooks.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
    /// Whether the startup probe reached the database. Modules that need it keep serving
    /// and report storage faults per request when this is false.
    pub database_ready: bool,
}

/// Idempotent SQL script owned by a module. `id` orders scripts across modules.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A self-contained slice of the HTTP API, mounted under [`Module::base_path`].
///
/// Bootstrap order: migrations are applied, then every module's `init`, then `start`.
/// `stop` runs in reverse registration order after the server drains.
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key; must be unique.
    fn name(&self) -> &'static str;

    /// Mount prefix. Defaults to `/api/{name}`.
    fn base_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    /// Router relative to `base_path`, with state and per-module layers applied.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI `paths`/`components` fragment; paths are relative to `base_path`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
