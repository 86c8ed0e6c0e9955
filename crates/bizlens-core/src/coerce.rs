//! # Cell Coercion
//!
//! Turns raw spreadsheet cells into the numbers and dates the dataset stores.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Coercion Never Fails                               │
//! │                                                                         │
//! │  to_number                                                              │
//! │  ├── Empty / ""          → 0                                            │
//! │  ├── Number(n)           → n   (NaN / ±inf → 0)                         │
//! │  ├── Text("12,500.50")   → 12500.5  (commas stripped)                   │
//! │  ├── Text("n/a")         → 0                                            │
//! │  └── Bool(_)             → 0                                            │
//! │                                                                         │
//! │  normalize_date                                                         │
//! │  ├── Number(45658)       → "2025-01-01"  (Excel serial)                 │
//! │  ├── Text("01/15/2025")  → "2025-01-15"                                 │
//! │  ├── Text("Q1 close")    → "Q1 close"    (verbatim passthrough)         │
//! │  └── Empty / 0           → ""                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One bad cell must never sink an upload, so nothing here returns `Result`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workbook::CellValue;

/// Output layout for every normalized date.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text layouts tried, in order, for date-only strings.
const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Text layouts tried, in order, for date-time strings without an offset.
const DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// =============================================================================
// Numbers
// =============================================================================

/// Converts any cell to a finite number. Never fails, never returns NaN.
///
/// ## Example
/// ```rust
/// use bizlens_core::coerce::to_number;
/// use bizlens_core::CellValue;
///
/// assert_eq!(to_number(&CellValue::text("1,250")), 1250.0);
/// assert_eq!(to_number(&CellValue::text("n/a")), 0.0);
/// assert_eq!(to_number(&CellValue::Empty), 0.0);
/// ```
pub fn to_number(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Empty | CellValue::Bool(_) => 0.0,
        CellValue::Number(n) => finite_or_zero(*n),
        CellValue::Text(s) => parse_number_text(s),
    }
}

/// Parses number-like text: commas stripped, surrounding whitespace ignored.
pub fn parse_number_text(text: &str) -> f64 {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return 0.0;
    }

    cleaned.parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

/// Reads a JSON field with the same rules as [`to_number`].
///
/// Missing keys and `null` give 0; numeric strings are parsed.
pub fn json_number(value: &Value, key: &str) -> f64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Some(Value::String(s)) => parse_number_text(s),
        _ => 0.0,
    }
}

#[inline]
fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Converts an Excel serial day number to a calendar date.
///
/// ## The 1900 Leap-Year Bug
/// Excel counts 1900-02-29 as a real day, so serials are offset by two from
/// a naive count starting at 1900-01-01. The fractional (time-of-day) part
/// is dropped.
///
/// ```rust
/// use bizlens_core::coerce::excel_serial_to_date;
///
/// let date = excel_serial_to_date(45658.0).unwrap();
/// assert_eq!(date.to_string(), "2025-01-01");
/// ```
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }

    let base = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    let days = (serial - 2.0).floor();

    // chrono's NaiveDate range is roughly ±262,000 years.
    if days.abs() > 90_000_000.0 {
        return None;
    }

    base.checked_add_signed(Duration::days(days as i64))
}

/// Normalizes a date cell to `YYYY-MM-DD` where possible.
///
/// ## Rules
/// - Empty cells, empty text and the number 0 → `""`
/// - Numbers are Excel serials
/// - Text is reparsed from common layouts, else returned verbatim
/// - Booleans are rendered as text
pub fn normalize_date(cell: &CellValue) -> String {
    if !cell.is_truthy() {
        return String::new();
    }

    match cell {
        CellValue::Number(n) => excel_serial_to_date(*n)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| cell.as_text()),
        CellValue::Text(s) => parse_date_text(s)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| s.clone()),
        other => other.as_text(),
    }
}

/// Tries every supported text layout; `None` when nothing matches.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    if let Some(date) = DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
    {
        return Some(date);
    }

    DATE_TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .map(|dt| dt.date())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_to_number_plain_and_comma_formatted() {
        assert_eq!(to_number(&CellValue::Number(42.5)), 42.5);
        assert_eq!(to_number(&CellValue::text("12,500.75")), 12500.75);
        assert_eq!(to_number(&CellValue::text(" 1,000 ")), 1000.0);
        assert_eq!(to_number(&CellValue::text("-300")), -300.0);
    }

    #[test]
    fn test_to_number_malformed_is_zero() {
        assert_eq!(to_number(&CellValue::Empty), 0.0);
        assert_eq!(to_number(&CellValue::text("")), 0.0);
        assert_eq!(to_number(&CellValue::text(",")), 0.0);
        assert_eq!(to_number(&CellValue::text("SAR 100")), 0.0);
        assert_eq!(to_number(&CellValue::text("NaN")), 0.0);
        assert_eq!(to_number(&CellValue::text("inf")), 0.0);
        assert_eq!(to_number(&CellValue::Number(f64::NAN)), 0.0);
        assert_eq!(to_number(&CellValue::Bool(true)), 0.0);
    }

    #[test]
    fn test_json_number() {
        let value = json!({ "price": 19.5, "units": "1,200", "notes": "x", "none": null });
        assert_eq!(json_number(&value, "price"), 19.5);
        assert_eq!(json_number(&value, "units"), 1200.0);
        assert_eq!(json_number(&value, "notes"), 0.0);
        assert_eq!(json_number(&value, "none"), 0.0);
        assert_eq!(json_number(&value, "missing"), 0.0);
    }

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(excel_serial_to_date(45658.0).unwrap().to_string(), "2025-01-01");
        assert_eq!(excel_serial_to_date(45689.0).unwrap().to_string(), "2025-02-01");
        // Time-of-day fraction is dropped.
        assert_eq!(excel_serial_to_date(45658.75).unwrap().to_string(), "2025-01-01");
        assert!(excel_serial_to_date(f64::INFINITY).is_none());
    }

    #[test]
    fn test_normalize_date_cells() {
        assert_eq!(normalize_date(&CellValue::Number(45658.0)), "2025-01-01");
        assert_eq!(normalize_date(&CellValue::text("2025-03-05")), "2025-03-05");
        assert_eq!(normalize_date(&CellValue::text("03/05/2025")), "2025-03-05");
        assert_eq!(normalize_date(&CellValue::text("2025/03/05")), "2025-03-05");
        assert_eq!(normalize_date(&CellValue::text("Mar 5, 2025")), "2025-03-05");
        assert_eq!(normalize_date(&CellValue::text("March 5, 2025")), "2025-03-05");
        assert_eq!(normalize_date(&CellValue::text("2025-03-05T10:30:00")), "2025-03-05");
        assert_eq!(normalize_date(&CellValue::text("2025-03-05T10:30:00Z")), "2025-03-05");
    }

    #[test]
    fn test_normalize_date_passthrough_and_blank() {
        assert_eq!(normalize_date(&CellValue::text("Q1 close")), "Q1 close");
        assert_eq!(normalize_date(&CellValue::Empty), "");
        assert_eq!(normalize_date(&CellValue::text("")), "");
        assert_eq!(normalize_date(&CellValue::Number(0.0)), "");
    }

    proptest! {
        #[test]
        fn prop_to_number_is_always_finite(text in ".*") {
            prop_assert!(to_number(&CellValue::Text(text)).is_finite());
        }

        #[test]
        fn prop_comma_grouping_is_ignored(n in -1_000_000i64..1_000_000i64) {
            let grouped = group_thousands(n);
            prop_assert_eq!(to_number(&CellValue::Text(grouped)), n as f64);
        }

        #[test]
        fn prop_any_number_cell_is_finite(n in any::<f64>()) {
            prop_assert!(to_number(&CellValue::Number(n)).is_finite());
        }
    }

    fn group_thousands(n: i64) -> String {
        let digits = n.unsigned_abs().to_string();
        let mut out = String::new();
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        if n < 0 {
            format!("-{}", out)
        } else {
            out
        }
    }
}
