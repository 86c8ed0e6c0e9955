//! # Workbook Model
//!
//! The in-memory spreadsheet shape ingestion consumes: an ordered list of
//! named sheets, each a grid of rows whose FIRST row is the header row.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Workbook                                                               │
//! │  ├── Sheet "Cash Flow Statement"                                        │
//! │  │     row 0: Date       │ Description │ Cash In │ Cash Out │ ...      │ ← headers
//! │  │     row 1: 45658      │ Opening     │ 5,000   │          │ ...      │
//! │  │     row 2: 2025-02-01 │ Rent        │         │ 1200     │ ...      │
//! │  ├── Sheet "Contribution Margin"                                        │
//! │  └── Sheet "Pricing Sensitivity"                                        │
//! │                                                                         │
//! │  records() ──► [{ "Date": Number(45658), "Description": Text(...) }]    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any spreadsheet reader can fill this model. The `xlsx` feature provides
//! one backed by calamine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Cell Value
// =============================================================================

/// A single raw cell as read from the spreadsheet.
///
/// Dates arrive as `Number` (Excel serial) or `Text`, exactly as the
/// spreadsheet stored them. Interpretation happens in [`crate::coerce`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Returns true for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Spreadsheet truthiness used for key-column row filtering.
    ///
    /// Empty cells, empty text, `0` and `false` are all falsy, so a blank
    /// trailing row never turns into an unnamed product.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Bool(b) => *b,
        }
    }

    /// Renders the cell as display text (empty cells become "").
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// Integral numbers render without a trailing ".0" (header cells like `2024`).
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// =============================================================================
// Sheet
// =============================================================================

/// One row keyed by header text. Missing cells read as `Empty`.
#[derive(Debug, Clone, Default)]
pub struct Record {
    cells: HashMap<String, CellValue>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl Record {
    /// Returns the cell under `column`, or `Empty` when absent.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }
}

/// A named grid of cells; row 0 is the header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Creates a sheet from its name and raw rows (header row first).
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Sheet {
            name: name.into(),
            rows,
        }
    }

    /// Header texts from the first row (empty when the sheet has no rows).
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.iter().map(CellValue::as_text).collect())
            .unwrap_or_default()
    }

    /// Data rows keyed by header text, in sheet order.
    ///
    /// ## Rules
    /// - Rows where every cell is blank are skipped
    /// - Columns without a header text are ignored
    /// - A repeated header keeps its first column
    pub fn records(&self) -> Vec<Record> {
        let headers = self.headers();

        self.rows
            .iter()
            .skip(1)
            .filter(|row| !row.iter().all(CellValue::is_blank))
            .map(|row| {
                let mut cells = HashMap::with_capacity(headers.len());
                for (index, header) in headers.iter().enumerate() {
                    if header.is_empty() || cells.contains_key(header) {
                        continue;
                    }
                    let value = row.get(index).cloned().unwrap_or_default();
                    cells.insert(header.clone(), value);
                }
                Record { cells }
            })
            .collect()
    }
}

// =============================================================================
// Workbook
// =============================================================================

/// An uploaded spreadsheet: sheets in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Workbook { sheets }
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Finds a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
