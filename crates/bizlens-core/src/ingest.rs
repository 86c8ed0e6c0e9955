//! # Workbook Ingestion
//!
//! Validates an uploaded workbook's structure and parses it into a
//! [`BusinessDataset`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Upload Ingestion                                  │
//! │                                                                         │
//! │  bytes ──► check_upload_size ──► Workbook (xlsx reader) ──┐             │
//! │                                                           ▼             │
//! │                                              validate_structure         │
//! │                                     ┌─────────────┴──────────────┐      │
//! │                                     │ sheets missing?            │      │
//! │                                     │   yes → sheet issues ONLY  │      │
//! │                                     │   no  → every column issue │      │
//! │                                     └─────────────┬──────────────┘      │
//! │                                      issues? ──► IngestError::Validation│
//! │                                                   │                     │
//! │                                                   ▼ none                │
//! │                                   parse sheets (coerce every cell)      │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                           BusinessDataset               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Structure problems are all-or-nothing; cell problems never are.

use tracing::debug;

use crate::coerce::{normalize_date, to_number};
use crate::error::{IngestError, IngestResult, StructureIssue};
use crate::types::{BusinessDataset, CashFlowEntry, PricingScenario, Product};
use crate::workbook::{CellValue, Record, Sheet, Workbook};
use crate::{
    CASH_FLOW_SHEET, CONTRIBUTION_MARGIN_SHEET, MAX_UPLOAD_BYTES, PRICING_SENSITIVITY_SHEET,
    REQUIRED_SHEETS,
};

// =============================================================================
// Required Columns
// =============================================================================

/// Headers the "Cash Flow Statement" sheet must carry.
pub const CASH_FLOW_COLUMNS: [&str; 6] = [
    "Date",
    "Description",
    "Cash In",
    "Cash Out",
    "Net Cash Flow",
    "Running Balance",
];

/// Headers the "Contribution Margin" sheet must carry.
pub const CONTRIBUTION_MARGIN_COLUMNS: [&str; 8] = [
    "Item",
    "Value",
    "Price",
    "Variable Cost",
    "Fixed Costs",
    "CM",
    "Break-Even Units",
    "Break-Even SAR",
];

/// Headers the "Pricing Sensitivity" sheet must carry.
pub const PRICING_SENSITIVITY_COLUMNS: [&str; 7] = [
    "Scenario",
    "Price",
    "Units Sold",
    "Revenue",
    "Variable Cost",
    "CM",
    "Profit",
];

/// Required columns per sheet, in reporting order.
fn required_columns() -> [(&'static str, &'static [&'static str]); 3] {
    [
        (CASH_FLOW_SHEET, &CASH_FLOW_COLUMNS),
        (CONTRIBUTION_MARGIN_SHEET, &CONTRIBUTION_MARGIN_COLUMNS),
        (PRICING_SENSITIVITY_SHEET, &PRICING_SENSITIVITY_COLUMNS),
    ]
}

// =============================================================================
// Size Guard
// =============================================================================

/// Rejects uploads larger than `max` bytes before any parsing happens.
///
/// `max` is clamped to [`MAX_UPLOAD_BYTES`] so configuration can only
/// tighten the ceiling.
pub fn check_upload_size(size: usize, max: usize) -> IngestResult<()> {
    let max = max.min(MAX_UPLOAD_BYTES);
    if size > max {
        return Err(IngestError::TooLarge { size, max });
    }
    Ok(())
}

// =============================================================================
// Validation
// =============================================================================

/// Checks that every required sheet and column is present.
///
/// ## Reporting Rules
/// - Any missing sheet: ONLY the missing sheets are reported
/// - All sheets present: every missing column on every sheet is reported
///
/// Returns the full issue list; empty means the structure is valid.
pub fn validate_structure(workbook: &Workbook) -> Vec<StructureIssue> {
    let missing_sheets: Vec<StructureIssue> = REQUIRED_SHEETS
        .iter()
        .filter(|name| workbook.sheet(name).is_none())
        .map(|name| StructureIssue::missing_sheet(*name))
        .collect();

    if !missing_sheets.is_empty() {
        return missing_sheets;
    }

    let mut issues = Vec::new();
    for (sheet_name, columns) in required_columns() {
        let headers = workbook
            .sheet(sheet_name)
            .map(Sheet::headers)
            .unwrap_or_default();

        issues.extend(
            columns
                .iter()
                .filter(|column| !headers.iter().any(|h| h == *column))
                .map(|column| StructureIssue::missing_column(sheet_name, *column)),
        );
    }

    issues
}

// =============================================================================
// Parsing
// =============================================================================

/// Validates then parses a workbook into a dataset.
///
/// ## Errors
/// `IngestError::Validation` carrying every structural issue. Malformed
/// cells are never an error; they become 0 or "".
///
/// ## Example
/// ```rust
/// use bizlens_core::ingest::parse_workbook;
/// use bizlens_core::{IngestError, Workbook};
///
/// let err = parse_workbook(&Workbook::default()).unwrap_err();
/// assert!(matches!(err, IngestError::Validation(ref issues) if issues.len() == 3));
/// ```
pub fn parse_workbook(workbook: &Workbook) -> IngestResult<BusinessDataset> {
    let issues = validate_structure(workbook);
    if !issues.is_empty() {
        debug!(issue_count = issues.len(), "Workbook failed structure validation");
        return Err(IngestError::Validation(issues));
    }

    let cash_flow = sheet_records(workbook, CASH_FLOW_SHEET)
        .iter()
        .map(parse_cash_flow_row)
        .collect::<Vec<_>>();
    debug!(rows = cash_flow.len(), "Cash flow rows parsed");

    let products = sheet_records(workbook, CONTRIBUTION_MARGIN_SHEET)
        .iter()
        .filter(|row| row.get("Item").is_truthy())
        .map(parse_product_row)
        .collect::<Vec<_>>();
    debug!(products = products.len(), "Products parsed");

    let pricing_scenarios = sheet_records(workbook, PRICING_SENSITIVITY_SHEET)
        .iter()
        .filter(|row| row.get("Scenario").is_truthy())
        .map(parse_pricing_row)
        .collect::<Vec<_>>();
    debug!(scenarios = pricing_scenarios.len(), "Pricing scenarios parsed");

    let fixed_cost = products.first().map(|p| p.fixed_costs).unwrap_or(0.0);

    Ok(BusinessDataset {
        fixed_cost,
        products,
        cash_flow,
        pricing_scenarios,
    })
}

fn sheet_records(workbook: &Workbook, name: &str) -> Vec<Record> {
    workbook.sheet(name).map(Sheet::records).unwrap_or_default()
}

/// Falsy cells become "", anything else its display text.
fn text_or_empty(cell: &CellValue) -> String {
    if cell.is_truthy() {
        cell.as_text()
    } else {
        String::new()
    }
}

fn parse_cash_flow_row(row: &Record) -> CashFlowEntry {
    CashFlowEntry {
        date: normalize_date(row.get("Date")),
        description: text_or_empty(row.get("Description")),
        cash_in: to_number(row.get("Cash In")),
        cash_out: to_number(row.get("Cash Out")),
        net_cash_flow: Some(to_number(row.get("Net Cash Flow"))),
        running_balance: Some(to_number(row.get("Running Balance"))),
    }
}

fn parse_product_row(row: &Record) -> Product {
    Product {
        name: text_or_empty(row.get("Item")),
        value: text_or_empty(row.get("Value")),
        price_per_unit: to_number(row.get("Price")),
        variable_cost_per_unit: to_number(row.get("Variable Cost")),
        fixed_costs: to_number(row.get("Fixed Costs")),
        contribution_margin: to_number(row.get("CM")),
        break_even_units: to_number(row.get("Break-Even Units")),
        break_even_revenue_sar: to_number(row.get("Break-Even SAR")),
    }
}

fn parse_pricing_row(row: &Record) -> PricingScenario {
    PricingScenario {
        scenario_label: text_or_empty(row.get("Scenario")),
        price: to_number(row.get("Price")),
        units_sold: to_number(row.get("Units Sold")),
        revenue: to_number(row.get("Revenue")),
        variable_cost: to_number(row.get("Variable Cost")),
        contribution_margin: to_number(row.get("CM")),
        profit: to_number(row.get("Profit")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
