//! # Repository Module
//!
//! Database repository implementations for BizLens.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command                                                           │
//! │       │  db.scenarios().list_pricing("owner-1")                        │
//! │       ▼                                                                 │
//! │  ScenarioRepository                                                    │
//! │  ├── insert_pricing / get_pricing / list_pricing / copy_pricing        │
//! │  └── insert_break_even / list_break_even / delete_break_even           │
//! │       │  SQL (sqlx::query_as → *Row: FromRow → domain type)            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read is scoped by owner id: one owner's ids never resolve for
//! another owner.
//!
//! ## Available Repositories
//!
//! - [`business_data::BusinessDataRepository`] - One uploaded dataset per owner
//! - [`scenario::ScenarioRepository`] - Break-even and pricing scenarios
//! - [`recommendation::RecommendationRepository`] - Advisor recommendations

pub mod business_data;
pub mod recommendation;
pub mod scenario;
