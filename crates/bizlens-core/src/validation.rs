//! # Validation Module
//!
//! Input validation for the fields people type: scenario names, advisor
//! recommendation text, ids and amounts.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Uploaded workbook cells ──► coerce (never fails, see crate::coerce)    │
//! │                                                                         │
//! │  Typed input (CLI args, JSON drafts)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  THIS MODULE: required / length / finite / non-negative                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite: NOT NULL, foreign keys                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bizlens_core::validation::{validate_recommendation_text, validate_uuid};
//!
//! let text = validate_recommendation_text("  Raise the price by 5%.  ").unwrap();
//! assert_eq!(text, "Raise the price by 5%.");
//! assert!(validate_uuid("not-a-uuid").is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product, scenario or tag name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted free text (descriptions, recommendations).
pub const MAX_TEXT_LENGTH: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and checks it is non-empty and at most `max` characters.
///
/// ## Returns
/// The trimmed text.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    check_length(field, value, max)?;
    Ok(value.to_string())
}

/// Trims optional text, substituting `default` when absent or blank.
pub fn optional_text_or(
    field: &str,
    value: Option<&str>,
    default: &str,
    max: usize,
) -> ValidationResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => {
            check_length(field, text, max)?;
            Ok(text.to_string())
        }
        _ => Ok(default.to_string()),
    }
}

/// Validates the text of an advisor recommendation.
///
/// ## Rules
/// - Trimmed before checking
/// - Must not be empty
/// - At most 2000 characters
pub fn validate_recommendation_text(text: &str) -> ValidationResult<String> {
    validate_required_text("text", text, MAX_TEXT_LENGTH)
}

/// Validates a user id (owner, advisor or manager).
///
/// User ids come from the identity provider and are opaque; they only need
/// to be present and free of whitespace.
pub fn validate_user_id(field: &str, id: &str) -> ValidationResult<String> {
    let id = validate_required_text(field, id, MAX_NAME_LENGTH)?;

    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(id)
}

fn check_length(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a money or unit amount typed by the owner.
///
/// ## Rules
/// - Must be finite
/// - Must not be negative (zero is allowed)
pub fn validate_amount(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a record id (scenario, recommendation).
///
/// ## Example
/// ```rust
/// use bizlens_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_recommendation_text() {
        assert_eq!(
            validate_recommendation_text("  Cut packaging cost.\n").unwrap(),
            "Cut packaging cost."
        );
        assert!(matches!(
            validate_recommendation_text("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_recommendation_text(&"a".repeat(2000)).is_ok());
        assert!(matches!(
            validate_recommendation_text(&"a".repeat(2001)),
            Err(ValidationError::TooLong { max: 2000, .. })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let arabic = "ر".repeat(2000);
        assert!(validate_recommendation_text(&arabic).is_ok());
    }

    #[test]
    fn test_optional_text_defaults() {
        assert_eq!(
            optional_text_or("tag", None, "Break-Even", MAX_NAME_LENGTH).unwrap(),
            "Break-Even"
        );
        assert_eq!(
            optional_text_or("tag", Some("  "), "Break-Even", MAX_NAME_LENGTH).unwrap(),
            "Break-Even"
        );
        assert_eq!(
            optional_text_or("tag", Some(" Promo "), "Break-Even", MAX_NAME_LENGTH).unwrap(),
            "Promo"
        );
        assert!(optional_text_or("tag", Some("xxxx"), "", 3).is_err());
    }

    #[test]
    fn test_validate_user_id() {
        assert_eq!(validate_user_id("owner_id", " owner-1 ").unwrap(), "owner-1");
        assert!(validate_user_id("owner_id", "").is_err());
        assert!(validate_user_id("owner_id", "two words").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("price", 0.0).is_ok());
        assert!(validate_amount("price", 19.99).is_ok());
        assert!(matches!(
            validate_amount("price", -0.01),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            validate_amount("price", f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
