//! # Spreadsheet Reader
//!
//! Decodes uploaded `.xlsx` / `.xls` / `.ods` bytes into a [`Workbook`]
//! using calamine. Only compiled with the `xlsx` feature.
//!
//! Date cells keep their Excel serial number so [`crate::coerce`] owns every
//! date decision.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::error::{IngestError, IngestResult};
use crate::workbook::{CellValue, Sheet, Workbook};

/// Reads every sheet of a spreadsheet file held in memory.
pub fn read_workbook(bytes: &[u8]) -> IngestResult<Workbook> {
    let mut sheets_reader = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestError::Unreadable(e.to_string()))?;

    let names = sheets_reader.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());

    for name in names {
        let range = sheets_reader
            .worksheet_range(&name)
            .map_err(|e| IngestError::Unreadable(format!("sheet \"{}\": {}", name, e)))?;

        let rows: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        debug!(sheet = %name, rows = rows.len(), "Read worksheet");
        sheets.push(Sheet::new(name, rows));
    }

    Ok(Workbook::new(sheets))
}

/// Maps one calamine cell onto the workbook model.
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_mapping() {
        assert_eq!(cell_value(&Data::Int(42)), CellValue::Number(42.0));
        assert_eq!(cell_value(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(
            cell_value(&Data::String("Widget".into())),
            CellValue::text("Widget")
        );
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            cell_value(&Data::DateTimeIso("2025-01-01T00:00:00".into())),
            CellValue::text("2025-01-01T00:00:00")
        );
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let err = read_workbook(b"definitely not a spreadsheet").unwrap_err();
        assert!(matches!(err, IngestError::Unreadable(_)));
    }
}
