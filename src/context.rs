// src/context.rs
use anyhow::Result;
use tracing::info;

use crate::config::AppConfig;
use crate::database::DatabaseConfig;

/// Explicitly constructed process context: configuration plus the database
/// lifecycle. Built once at startup and passed to every component instead
/// of living in ambient global state.
pub struct AppContext {
    pub config: AppConfig,
    pub db: DatabaseConfig,
}

impl AppContext {
    /// Acquire all process-wide resources: connect the pool and run
    /// migrations. Any failure here aborts startup.
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        let mut db = DatabaseConfig::new(config.environment.database_path.clone());
        db.init_pool().await?;
        db.migrate().await?;

        info!("Application context initialized");
        Ok(Self { config, db })
    }

    /// Release process-wide resources on shutdown.
    pub async fn shutdown(&self) {
        self.db.close().await;
        info!("Application context shut down");
    }
}
