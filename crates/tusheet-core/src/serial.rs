//! Conversion between spreadsheet-native cell encodings and canonical text.
//!
//! Google Sheets returns values written with the `RAW` input option as plain
//! strings, so no conversion happens on that backend. Excel Online returns
//! dates and numeric-looking times as serial numbers whenever the cell was
//! populated by Excel's own formatting engine: dates count days since an
//! epoch anchored at 1899-12-30 (the historical 1900 leap-year bug folded
//! into the epoch), and times appear as plain decimal numbers.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Day zero of the Excel date serial scheme.
///
/// Serial 1 is 1899-12-31 and serial 2 is 1900-01-01: Excel treats 1900 as
/// a leap year, so anchoring the epoch two days before 1900-01-01 yields
/// correct calendar dates for every serial after the phantom 1900-02-29.
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch date")
}

/// What a single spreadsheet cell can deserialize to.
///
/// Both backing APIs deliver ranges as JSON arrays of arrays; a cell is a
/// string, a number, a boolean, or null depending on how it was populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A plain string cell.
    Text(String),
    /// A numeric cell (Excel serial date, decimal time, or any number).
    Number(f64),
    /// A boolean cell.
    Bool(bool),
    /// An empty cell (JSON null).
    Empty,
}

impl CellValue {
    /// Stringifies the cell without serial interpretation.
    pub fn into_text(self) -> String {
        match self {
            CellValue::Text(s) => s,
            CellValue::Number(n) => format_number(n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

/// Normalizes a date cell to `YYYY-MM-DD`.
///
/// Strings pass through unchanged. Numbers greater than 1 are treated as
/// Excel date serials and converted through the corrected epoch; fractional
/// days truncate to the calendar day. Anything else stringifies.
///
/// The Date column is user-editable, so a numeric cell is not guaranteed to
/// be a plausible serial; a value too large for calendar arithmetic (say,
/// pasted epoch milliseconds) degrades to its plain numeric rendering
/// instead of failing.
pub fn date_to_string(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) if *n > 1.0 => {
            match Duration::try_days(*n as i64)
                .and_then(|days| serial_epoch().checked_add_signed(days))
            {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => format_number(*n),
            }
        }
        other => other.clone().into_text(),
    }
}

/// Normalizes a time cell to its decimal-hours text form.
///
/// Strings pass through unchanged; numbers render in minimal decimal form
/// (`2.5` stays "2.5", `3.0` becomes "3"). The value is decimal hours, not a
/// fraction of a day, and may exceed 24 for accumulated totals.
pub fn time_to_string(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => format_number(*n),
        other => other.clone().into_text(),
    }
}

/// Minimal decimal rendering, matching how the spreadsheet UIs display
/// numbers: no trailing `.0` on whole values.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_serial_conversion() {
        assert_eq!(date_to_string(&CellValue::Number(45306.0)), "2024-01-15");
        assert_eq!(date_to_string(&CellValue::Number(45895.0)), "2025-08-26");
        assert_eq!(date_to_string(&CellValue::Number(2.0)), "1900-01-01");
    }

    #[test]
    fn date_string_passes_through() {
        let cell = CellValue::Text("2024-01-16".to_string());
        assert_eq!(date_to_string(&cell), "2024-01-16");
    }

    #[test]
    fn date_fractional_serial_truncates() {
        assert_eq!(date_to_string(&CellValue::Number(45306.75)), "2024-01-15");
    }

    #[test]
    fn date_empty_cell() {
        assert_eq!(date_to_string(&CellValue::Empty), "");
    }

    #[test]
    fn date_out_of_range_number_keeps_numeric_rendering() {
        // Epoch milliseconds pasted into the Date column are far past any
        // representable calendar day.
        assert_eq!(
            date_to_string(&CellValue::Number(1_700_000_000_000.0)),
            "1700000000000"
        );
        assert_eq!(date_to_string(&CellValue::Number(1e18)), "1000000000000000000");
    }

    #[test]
    fn time_serial_conversion() {
        assert_eq!(time_to_string(&CellValue::Number(2.5)), "2.5");
        assert_eq!(time_to_string(&CellValue::Number(3.0)), "3");
        assert_eq!(time_to_string(&CellValue::Number(96.0)), "96");
    }

    #[test]
    fn time_string_passes_through() {
        let cell = CellValue::Text("3.0".to_string());
        assert_eq!(time_to_string(&cell), "3.0");
    }

    #[test]
    fn cell_value_deserializes_untagged() {
        let row: Vec<CellValue> =
            serde_json::from_str(r#"["abc", 45306, 2.5, true, null]"#).unwrap();
        assert_eq!(row[0], CellValue::Text("abc".to_string()));
        assert_eq!(row[1], CellValue::Number(45306.0));
        assert_eq!(row[2], CellValue::Number(2.5));
        assert_eq!(row[3], CellValue::Bool(true));
        assert_eq!(row[4], CellValue::Empty);
    }
}
