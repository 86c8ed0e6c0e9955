//! # State Module
//!
//! What every command runs against: the database handle and the loaded
//! configuration.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  main()                                                                 │
//! │    AppConfig::load(--config) ─────► DbState::open(&config)             │
//! │          │                                │                             │
//! │          ▼                                ▼                             │
//! │  ┌──────────────────┐          ┌──────────────────┐                    │
//! │  │   AppConfig      │          │    DbState       │                    │
//! │  │  db_path         │          │  Database        │                    │
//! │  │  max_upload_bytes│          │  (SQLite pool)   │                    │
//! │  └──────────────────┘          └──────────────────┘                    │
//! │                                                                         │
//! │  Both are read-only once built; DbState clones share one pool.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::{
    AppConfig, ConfigError, CONFIG_FILE_NAME, DB_FILE_NAME, ENV_DB_MAX_CONNECTIONS, ENV_DB_PATH,
    ENV_MAX_UPLOAD_BYTES,
};
pub use db::DbState;
