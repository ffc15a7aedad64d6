//! The canonical in-memory shape of a task record.
//!
//! A task lives in a spreadsheet as one row of a month partition, columns
//! A through E. The `uid` in column A is the only stable identity; every
//! other field is user-editable with no uniqueness constraint. The
//! spreadsheet document is the sole source of truth - no local copy is
//! authoritative.

use serde::{Deserialize, Serialize};

use crate::serial::{CellValue, date_to_string, time_to_string};

/// The fixed header row of every month partition (row 1, columns A-E).
pub const HEADER_ROW: [&str; 5] = ["UID", "Task Number", "Description", "Date", "Time"];

/// A single task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identity, independent of row position.
    pub uid: String,
    /// User-facing task number (free-form, not unique).
    pub number: String,
    /// Task description.
    pub description: String,
    /// Task date as `YYYY-MM-DD`.
    pub date: String,
    /// Time spent, decimal hours as text (may exceed 24).
    pub time: String,
}

impl Task {
    /// Maps one sheet row (columns A-E) into a task record.
    ///
    /// Missing trailing cells become empty strings. Date and time cells go
    /// through the serial normalizer, so rows written by Excel's formatting
    /// engine (numeric serials) and rows written as raw strings produce the
    /// same canonical record.
    pub fn from_row(row: &[CellValue]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or(CellValue::Empty);
        Self {
            uid: cell(0).into_text(),
            number: cell(1).into_text(),
            description: cell(2).into_text(),
            date: date_to_string(&cell(3)),
            time: time_to_string(&cell(4)),
        }
    }

    /// Produces the 5-cell row written to columns A-E.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.uid.clone(),
            self.number.clone(),
            self.description.clone(),
            self.date.clone(),
            self.time.clone(),
        ]
    }
}

/// Identity of one spreadsheet/workbook document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetInfo {
    /// Provider-specific document id.
    pub id: String,
    /// Display name (implementation suffixes like `.xlsx` already stripped).
    pub name: String,
}

impl SpreadsheetInfo {
    /// Creates a new spreadsheet identity.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn from_row_full() {
        let row = vec![
            text("abc123"),
            text("T-001"),
            text("Write spec"),
            text("2024-01-15"),
            text("2.5"),
        ];
        let task = Task::from_row(&row);
        assert_eq!(task.uid, "abc123");
        assert_eq!(task.number, "T-001");
        assert_eq!(task.description, "Write spec");
        assert_eq!(task.date, "2024-01-15");
        assert_eq!(task.time, "2.5");
    }

    #[test]
    fn from_row_pads_missing_trailing_cells() {
        let row = vec![text("abc123"), text("T-001")];
        let task = Task::from_row(&row);
        assert_eq!(task.uid, "abc123");
        assert_eq!(task.number, "T-001");
        assert_eq!(task.description, "");
        assert_eq!(task.date, "");
        assert_eq!(task.time, "");
    }

    #[test]
    fn from_row_normalizes_serials() {
        let row = vec![
            text("abc123"),
            text("T-001"),
            text("Write spec"),
            CellValue::Number(45306.0),
            CellValue::Number(2.5),
        ];
        let task = Task::from_row(&row);
        assert_eq!(task.date, "2024-01-15");
        assert_eq!(task.time, "2.5");
    }

    #[test]
    fn row_round_trip() {
        let task = Task {
            uid: "u1".into(),
            number: "1".into(),
            description: "d".into(),
            date: "2024-01-15".into(),
            time: "3".into(),
        };
        let row: Vec<CellValue> = task.to_row().into_iter().map(CellValue::Text).collect();
        assert_eq!(Task::from_row(&row), task);
    }

    #[test]
    fn header_row_shape() {
        assert_eq!(HEADER_ROW.len(), 5);
        assert_eq!(HEADER_ROW[0], "UID");
        assert_eq!(HEADER_ROW[4], "Time");
    }
}
