//! # bizlens-db: Database Layer for BizLens
//!
//! Persists uploaded datasets, saved scenarios and advisor recommendations
//! in SQLite using sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizLens Data Flow                                │
//! │                                                                         │
//! │  CLI command (upload, insights, scenario list)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bizlens-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   Database    │    │   Repositories   │   │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ BusinessData     │   │ (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ Scenario         │   │ 001_init    │  │   │
//! │  │   │               │    │ Recommendation   │   │             │  │   │
//! │  │   └───────────────┘    └──────────────────┘   └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        <platform data dir>/bizlens/bizlens.db                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bizlens_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("bizlens.db")).await?;
//! let stored = db.business_data().get("owner-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::business_data::{BusinessDataRepository, StoredDataset};
pub use repository::recommendation::RecommendationRepository;
pub use repository::scenario::ScenarioRepository;
