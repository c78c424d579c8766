#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use configs::DatabaseConfig;
use models::db::{connect_with_config, migrate};

// Migrations run once per test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> Option<DatabaseConfig> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(DatabaseConfig { url, min_connections: 1, acquire_timeout_secs: 10, ..Default::default() })
}

/// Fresh connection for the current test, or `None` when no database is configured.
pub async fn get_db() -> Option<DatabaseConnection> {
    let cfg = test_config()?;
    let migrated = *MIGRATED
        .get_or_init(|| async {
            match connect_with_config(&cfg).await {
                Ok(db) => migrate(&db).await.is_ok(),
                Err(_) => false,
            }
        })
        .await;
    if !migrated {
        return None;
    }
    connect_with_config(&cfg).await.ok()
}

/// Suffix that keeps names and emails unique across test runs.
pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
