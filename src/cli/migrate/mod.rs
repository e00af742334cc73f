//! Migrate command - applies PostgreSQL migrations

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::storage::{self, StorageConfig};

/// Apply migrations and exit
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    apply(&config).await
}

/// Apply pending migrations when the PostgreSQL backend is configured
pub async fn apply(config: &AppConfig) -> anyhow::Result<()> {
    let pg_config = match config.storage.storage_config()? {
        StorageConfig::Postgres(pg_config) => pg_config,
        StorageConfig::InMemory => {
            info!("In-memory storage configured, no migrations to run");
            return Ok(());
        }
    };

    let pool = storage::connect(&pg_config).await?;
    let applied = storage::run_user_migrations(&pool).await?;
    let version = storage::PostgresMigrator::new(pool).current_version().await?;

    info!(applied, version = ?version, "Migrations complete");
    Ok(())
}
