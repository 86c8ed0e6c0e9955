//! # Error Types
//!
//! Domain-specific error types for bizlens-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bizlens-core errors (this file)                                       │
//! │  ├── IngestError      - Workbook could not become a dataset            │
//! │  │   └── StructureIssue - One missing sheet / column                   │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - User-authored input failures                   │
//! │                                                                         │
//! │  bizlens-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → caller                 │
//! │        IngestError ──────────────────► ApiError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Structural workbook problems are AGGREGATED, never fail-fast
//! 3. Errors are enum variants, never String
//! 4. Cell-level problems are not errors at all (see [`crate::coerce`])

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Structure Issue
// =============================================================================

/// One structural problem found while validating an uploaded workbook.
///
/// ## User Workflow
/// ```text
/// Upload "q3.xlsx"
///      │
///      ▼
/// validate_structure()
///      │
///      ├── MissingSheet { "Pricing Sensitivity" }
///      │
///      ▼
/// UI lists: Missing required sheet: "Pricing Sensitivity"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StructureIssue {
    /// A required sheet is absent from the workbook.
    MissingSheet { sheet: String },

    /// A required header is absent from a present sheet's first row.
    MissingColumn { sheet: String, column: String },
}

impl StructureIssue {
    pub fn missing_sheet(sheet: impl Into<String>) -> Self {
        StructureIssue::MissingSheet {
            sheet: sheet.into(),
        }
    }

    pub fn missing_column(sheet: impl Into<String>, column: impl Into<String>) -> Self {
        StructureIssue::MissingColumn {
            sheet: sheet.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for StructureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureIssue::MissingSheet { sheet } => {
                write!(f, "Missing required sheet: \"{}\"", sheet)
            }
            StructureIssue::MissingColumn { sheet, column } => {
                write!(f, "{}: missing column \"{}\"", sheet, column)
            }
        }
    }
}

// =============================================================================
// Ingest Error
// =============================================================================

/// Failures turning an upload into a `BusinessDataset`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Workbook is missing sheets or columns. Carries EVERY issue found.
    #[error("Invalid workbook structure:\n{}", join_issues(.0))]
    Validation(Vec<StructureIssue>),

    /// Upload exceeds the in-memory parsing ceiling.
    #[error("Workbook is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    /// Bytes could not be decoded as a spreadsheet at all.
    #[error("Failed to read workbook: {0}")]
    Unreadable(String),
}

impl IngestError {
    /// Returns the structural issues if this is a validation failure.
    pub fn issues(&self) -> &[StructureIssue] {
        match self {
            IngestError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[StructureIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent domain rule violations. They should be caught and
/// translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No dataset has been uploaded for the owner.
    #[error("No business data uploaded for owner {0}")]
    DatasetNotFound(String),

    /// Scenario id does not exist for the owner.
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Comparison needs exactly two distinct scenarios.
    ///
    /// ## When This Occurs
    /// - Same id passed twice
    /// - More than two ids selected
    #[error("Scenario comparison needs exactly two distinct scenarios, got {0}")]
    InvalidComparison(usize),

    /// Advisor or manager session did not name the owner to act on.
    #[error("A {role} session must name the owner to act on")]
    OwnerRequired { role: String },

    /// Export could not be produced.
    #[error("Export failed: {0}")]
    Export(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Export(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user-authored input doesn't meet requirements.
/// Used for early validation before anything is persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Numeric value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for workbook ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

// =============================================================================
// Unit Tests
// =============================================================================
