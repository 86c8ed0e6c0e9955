//! # Database Handle
//!
//! ```text
//! AppConfig (db_path, db_max_connections)
//!      │
//!      ▼
//! DbConfig ──► Database::new ──► SqlitePool (WAL, foreign keys) ──► migrations
//!                   │
//!                   ├── business_data()   one dataset per owner
//!                   ├── scenarios()       break-even + pricing
//!                   └── recommendations() advisor notes
//! ```
//!
//! WAL lets dashboard reads proceed while an upload is being written.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::business_data::BusinessDataRepository;
use crate::repository::recommendation::RecommendationRepository;
use crate::repository::scenario::ScenarioRepository;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Where the database lives and how the pool is sized.
///
/// ```rust
/// use bizlens_db::DbConfig;
///
/// let config = DbConfig::new("/var/lib/bizlens/bizlens.db").max_connections(8);
/// assert_eq!(config.max_connections, 8);
/// assert!(config.run_migrations);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    /// Default: 5
    pub max_connections: u32,
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file-backed database, created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            run_migrations: true,
        }
    }

    /// A private in-memory database for tests.
    ///
    /// Each SQLite connection to `:memory:` opens its own empty database, so
    /// the pool is held at exactly one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

/// Shared handle to the pool. Clones share connections.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies pending migrations unless disabled.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        // An idle in-memory connection takes its data with it when reaped.
        let idle_timeout = (!config.is_in_memory()).then_some(IDLE_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(idle_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn business_data(&self) -> BusinessDataRepository {
        BusinessDataRepository::new(self.pool.clone())
    }

    pub fn scenarios(&self) -> ScenarioRepository {
        ScenarioRepository::new(self.pool.clone())
    }

    pub fn recommendations(&self) -> RecommendationRepository {
        RecommendationRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail with `ConnectionFailed` afterwards.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
        assert!(db.scenarios().list_pricing("owner-1").await.unwrap().is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config = DbConfig::new("/tmp/bizlens-test.db").run_migrations(false);
        assert_eq!(config.max_connections, 5);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);

        let err = db.business_data().get("owner-1").await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
