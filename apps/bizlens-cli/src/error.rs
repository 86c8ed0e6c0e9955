//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in BizLens                                │
//! │                                                                         │
//! │  bizlens upload q3.xlsx                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Workbook Error? ─── IngestError::Validation([...]) ──┐         │  │
//! │  │         │                                             │         │  │
//! │  │         ▼                                             ▼         │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ─── ApiError ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr:                                                                │
//! │  { "code": "INVALID_WORKBOOK",                                          │
//! │    "message": "Invalid workbook structure: ...",                        │
//! │    "issues": [ { "kind": "missingSheet", "sheet": "..." } ] }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bizlens_core::{CoreError, IngestError, StructureIssue};
use bizlens_db::DbError;
use serde::Serialize;

use crate::state::ConfigError;

/// API error returned from commands.
///
/// ## Serialization
/// This is what callers receive when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "pricing scenario not found: 5b0e..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Every structural problem found in a rejected workbook
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<StructureIssue>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Uploaded workbook is unreadable, too large or missing sheets/columns (400)
    InvalidWorkbook,

    /// Database operation failed (500)
    DatabaseError,

    /// Business logic error (422)
    BusinessLogic,

    /// Configuration could not be loaded (500)
    ConfigError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Duplicate { constraint } => {
                tracing::error!(constraint = %constraint, "Duplicate key");
                ApiError::new(ErrorCode::ValidationError, "Record already exists")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::CorruptPayload { entity, message } => {
                tracing::error!(entity = %entity, "Stored payload is corrupt: {}", message);
                ApiError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored {} could not be read; upload it again", entity),
                )
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DatasetNotFound(owner) => ApiError::new(
                ErrorCode::NotFound,
                format!("No business data uploaded for owner {}", owner),
            ),
            CoreError::ScenarioNotFound(id) => ApiError::not_found("Scenario", &id),
            err @ CoreError::InvalidComparison(_) => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            err @ CoreError::OwnerRequired { .. } => ApiError::validation(err.to_string()),
            CoreError::Export(e) => {
                tracing::error!("Export failed: {}", e);
                ApiError::internal(format!("Export failed: {}", e))
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts workbook ingestion errors to API errors.
impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        let message = err.to_string();
        let issues = match err {
            IngestError::Validation(issues) => issues,
            IngestError::TooLarge { .. } | IngestError::Unreadable(_) => Vec::new(),
        };
        ApiError {
            code: ErrorCode::InvalidWorkbook,
            message,
            issues,
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result alias for command functions.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_issues_survive_conversion() {
        let err: ApiError = IngestError::Validation(vec![
            StructureIssue::missing_sheet("Pricing Sensitivity"),
        ])
        .into();

        assert_eq!(err.code, ErrorCode::InvalidWorkbook);
        assert_eq!(err.issues.len(), 1);

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INVALID_WORKBOOK");
        assert_eq!(json["issues"][0]["sheet"], "Pricing Sensitivity");
    }

    #[test]
    fn test_issues_omitted_when_empty() {
        let err: ApiError = IngestError::TooLarge { size: 20, max: 10 }.into();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("issues").is_none());
    }

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: ApiError = DbError::not_found("pricing scenario", "abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "pricing scenario not found: abc");
    }

    #[test]
    fn test_query_failure_hides_sql_detail() {
        let err: ApiError = DbError::QueryFailed("no such column: secret".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secret"));
    }

    #[test]
    fn test_core_errors() {
        let err: ApiError = CoreError::InvalidComparison(1).into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err: ApiError = CoreError::OwnerRequired {
            role: "advisor".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.to_string().starts_with("[ValidationError]"));
    }
}
