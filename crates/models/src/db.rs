use std::{env, time::Duration};

use anyhow::Context;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

fn require_url(value: Option<String>) -> anyhow::Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .context("DATABASE_URL is not set")
}

/// `DATABASE_URL` from the environment, after loading `.env`.
pub fn database_url() -> anyhow::Result<String> {
    let _ = dotenvy::dotenv();
    require_url(env::var("DATABASE_URL").ok())
}

pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(database_url()?).await?;
    Ok(db)
}

/// Connect with pool sizing and timeouts taken from the `[database]` config section.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await?;
    info!(
        max_connections = cfg.max_connections,
        min_connections = cfg.min_connections,
        "database pool ready"
    );
    Ok(db)
}

/// Apply all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    migration::Migrator::up(db, None).await?;
    info!("database migrations applied");
    Ok(())
}
