//! Row addressing helpers shared by both adapters.
//!
//! Neither backing API can locate a row by value server-side, so uid lookup
//! is an explicit linear scan over a fetched column. Row positions here are
//! 1-based, matching A1-notation range addresses; the scan result is the
//! row number to address, or `None` for the not-found condition.

use tusheet_core::CellValue;

/// Scans a fetched column (rows of at most one cell each) for `uid`.
///
/// Returns the 1-based row number of the first match. Row 1 is the header
/// and never matches a real uid, but the scan does not special-case it; a
/// header-only or empty partition simply yields `None`.
pub fn find_uid_row(column: &[Vec<CellValue>], uid: &str) -> Option<usize> {
    column.iter().position(|row| {
        matches!(row.first(), Some(CellValue::Text(value)) if value == uid)
    }).map(|idx| idx + 1)
}

/// Computes the next writable row from a used-range row count.
///
/// `row_count` of `None` means the used range could not be read at all,
/// which Excel reports for a brand-new worksheet; both that and a
/// header-only sheet (`row_count == 1`) resolve to row 2, the first data
/// row. This is the canonical empty-partition state.
pub fn next_data_row(row_count: Option<u32>) -> u32 {
    let last_row = match row_count {
        Some(n) if n >= 1 => n,
        _ => 1,
    };
    last_row + 1
}

/// Formats the A1-notation address for `count` 5-column rows starting at
/// `start_row`.
pub fn data_range_address(start_row: u32, count: u32) -> String {
    let end_row = start_row + count.saturating_sub(1);
    format!("A{}:E{}", start_row, end_row)
}
