//! # Database State
//!
//! Wraps the `Database` connection for use in commands.
//!
//! ## Thread Safety
//! The `Database` struct from `bizlens-db` contains a `SqlitePool` which
//! is inherently thread-safe. Commands can run queries concurrently
//! without explicit locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn get_insights(db: &DbState, session: &Session, owner: Option<&str>)
//!     -> ApiResult<Insights>
//! {
//!     let stored = db.inner().business_data().get(&owner_id).await?;
//!     ...
//! }
//! ```

use bizlens_db::{Database, DbConfig, DbError, DbResult};
use tracing::info;

use super::config::AppConfig;

/// Wrapper around `Database` handed to every command.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Opens the database described by `config`, creating its folder first.
    pub async fn open(config: &AppConfig) -> DbResult<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    DbError::ConnectionFailed(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db_config =
            DbConfig::new(config.db_path.clone()).max_connections(config.db_max_connections);
        let db = Database::new(db_config).await?;

        info!("Database connected and migrations applied");
        Ok(DbState::new(db))
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
