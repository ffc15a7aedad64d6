//! Month-partition naming.
//!
//! Tasks are stored one worksheet/tab per month; a tab is a month partition
//! iff its name is exactly `YYYY-MM`. The first/default tab of a document is
//! never a partition - it holds only the identifier tag.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static MONTH_PARTITION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("invalid month partition regex"));

/// Returns true if `name` is a month-partition worksheet name.
pub fn is_month_partition(name: &str) -> bool {
    MONTH_PARTITION_REGEX.is_match(name)
}

/// The partition name a task dated `date` belongs to.
pub fn month_partition_name(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_month_names() {
        assert!(is_month_partition("2024-01"));
        assert!(is_month_partition("1999-12"));
    }

    #[test]
    fn rejects_other_names() {
        assert!(!is_month_partition("Sheet1"));
        assert!(!is_month_partition("2024-1"));
        assert!(!is_month_partition("2024-01-15"));
        assert!(!is_month_partition("2024-01 "));
        assert!(!is_month_partition(""));
    }

    #[test]
    fn name_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(month_partition_name(date), "2024-01");
    }
}
