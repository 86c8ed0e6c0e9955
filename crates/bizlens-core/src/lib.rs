//! # bizlens-core: Pure Business Logic for BizLens
//!
//! This crate is the **heart** of BizLens. It turns an uploaded business
//! workbook into a normalized dataset and derives every analytic the owner
//! and advisor dashboards display, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizLens Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboards (React)                           │   │
//! │  │    Upload ──► Owner Dashboard ──► Scenarios ──► Advisor Review  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ bizlens-cli commands                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bizlens-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  ingest   │  │ insights  │  │ scenario  │  │ breakeven │  │   │
//! │  │   │ Workbook  │  │ BEP/Margin│  │ Metrics   │  │ Calculator│  │   │
//! │  │   │ → Dataset │  │ Cash/Score│  │ Risk      │  │ Records   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bizlens-db (Database Layer)                    │   │
//! │  │        SQLite datasets, scenarios, advisor recommendations      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BusinessDataset, scenario records, Session)
//! - [`workbook`] - In-memory spreadsheet model (named sheets, header row, cells)
//! - [`coerce`] - Numeric and date coercion for raw cells
//! - [`ingest`] - Workbook validation and parsing into a `BusinessDataset`
//! - [`insights`] - Dashboard analytics (break-even, margin, cash flow, score)
//! - [`scenario`] - Scenario risk engine (classification, stress test, risk)
//! - [`breakeven`] - Break-even calculator and saved break-even scenarios
//! - [`export`] - CSV export of dashboard insights
//! - [`validation`] - Input validation for user-authored fields
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Degrade, don't fail**: malformed cells become 0, never NaN
//! 4. **Explicit Errors**: structural problems are typed and aggregated
//!
//! ## Example Usage
//!
//! ```rust
//! use bizlens_core::insights::generate_insights;
//! use bizlens_core::types::{BusinessDataset, Product};
//!
//! let dataset = BusinessDataset {
//!     fixed_cost: 1200.0,
//!     products: vec![Product::priced("Widget", 20.0, 8.0)],
//!     ..BusinessDataset::default()
//! };
//!
//! let insights = generate_insights(&dataset);
//! assert_eq!(insights.bep_insights[0].break_even_units, Some(100));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod breakeven;
pub mod coerce;
pub mod error;
pub mod export;
pub mod ingest;
pub mod insights;
pub mod scenario;
pub mod types;
pub mod validation;
pub mod workbook;

#[cfg(feature = "xlsx")]
pub mod xlsx;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, IngestError, StructureIssue, ValidationError};
pub use insights::{generate_insights, Insights};
pub use scenario::{assess, ScenarioAssessment, ScenarioInput};
pub use types::*;
pub use workbook::{CellValue, Sheet, Workbook};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest workbook accepted for upload (10 MiB).
///
/// ## Business Reason
/// Parsing holds the whole workbook in memory at once; owner workbooks are
/// a few hundred rows, so anything near this size is almost certainly the
/// wrong file.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Sheet holding the dated cash-in / cash-out ledger.
pub const CASH_FLOW_SHEET: &str = "Cash Flow Statement";

/// Sheet holding per-product contribution margin rows.
pub const CONTRIBUTION_MARGIN_SHEET: &str = "Contribution Margin";

/// Sheet holding price sensitivity scenarios.
pub const PRICING_SENSITIVITY_SHEET: &str = "Pricing Sensitivity";

/// Every sheet an upload must contain, in reporting order.
pub const REQUIRED_SHEETS: [&str; 3] = [
    CASH_FLOW_SHEET,
    CONTRIBUTION_MARGIN_SHEET,
    PRICING_SENSITIVITY_SHEET,
];
