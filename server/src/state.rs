use std::{str::FromStr, time::Duration};

use color_eyre::{eyre::WrapErr, Result};
use costing::RecipeCost;
use db::setup_db_pool;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use crate::cache::TtlCache;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub port: u16,
    pub cache_ttl: Duration,
    pub cache_sweep_interval: Duration,
    pub default_markup_percent: f64,
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env")]
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env_or("PORT", 3000)?,
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", 300)?),
            cache_sweep_interval: Duration::from_secs(env_or("CACHE_SWEEP_SECS", 60)?),
            default_markup_percent: env_or(
                "DEFAULT_MARKUP_PERCENT",
                costing::pricing::DEFAULT_MARKUP_PERCENT,
            )?,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cache_ttl: Duration::from_secs(300),
            cache_sweep_interval: Duration::from_secs(60),
            default_markup_percent: costing::pricing::DEFAULT_MARKUP_PERCENT,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid {key}: {value}")),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl VersionInfo {
    pub(crate) fn from_env() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub app: AppConfig,
    pub versions: VersionInfo,
    pub db: PgPool,
    pub recipe_costs: TtlCache<RecipeCost>,
}

impl AppState {
    #[instrument(name = "AppState::from_env", err)]
    pub async fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .wrap_err("Missing DATABASE_URL, needed for app launch")?;

        let app_state = AppState::new(AppConfig::from_env()?, setup_db_pool(&database_url).await?);

        Ok(app_state)
    }

    pub(crate) fn new(app: AppConfig, db: PgPool) -> Self {
        Self {
            recipe_costs: TtlCache::new(app.cache_ttl),
            versions: VersionInfo::from_env(),
            app,
            db,
        }
    }
}
