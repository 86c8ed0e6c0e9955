//! # Database Error Types
//!
//! ```text
//! sqlx::Error ──────────┐
//! MigrateError ─────────┼──► DbError ──► ApiError (bizlens-cli)
//! serde_json (payload) ─┘
//! ```
//!
//! Only `NotFound`, `Duplicate` and `CorruptPayload` carry details a caller
//! may show. The rest are logged and reported generically by the CLI.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// The owner has no record with this id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Inserting a scenario or recommendation whose id is already taken.
    #[error("Duplicate key: {constraint}")]
    Duplicate { constraint: String },

    /// The pool could not be opened, is closed, or timed out.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The dataset JSON in `business_data` no longer decodes.
    #[error("Stored {entity} payload is corrupt: {message}")]
    CorruptPayload { entity: String, message: String },

    /// Anything sqlx reports that fits none of the above (decode, io, tls).
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn corrupt(entity: impl Into<String>, err: impl std::fmt::Display) -> Self {
        DbError::CorruptPayload {
            entity: entity.into(),
            message: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                // "UNIQUE constraint failed: pricing_scenarios.id"
                match msg.strip_prefix("UNIQUE constraint failed: ") {
                    Some(constraint) => DbError::Duplicate {
                        constraint: constraint.to_string(),
                    },
                    None => DbError::QueryFailed(msg.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("timed out waiting for a connection".to_string())
            }
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
