//! The identifier tag written to cell A1 of new documents.
//!
//! The tag proves a document was created by this system (as opposed to an
//! arbitrary user spreadsheet) and carries a schema version. It is written
//! once at creation time and read-only afterward.

use std::sync::LazyLock;

use regex::Regex;

/// Schema version stamped into newly created documents.
pub const APP_VERSION: &str = "1.0.0";

static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^created:tutasks\.com version:(.+)$").expect("invalid identifier regex")
});

/// The literal cell content written to A1 at creation time.
pub fn identifier_cell_value() -> String {
    format!("created:tutasks.com version:{}", APP_VERSION)
}

/// Matches a cell value against the identifier pattern, returning the
/// captured version string on success.
pub fn parse_identifier(value: &str) -> Option<&str> {
    IDENTIFIER_REGEX
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let cell = identifier_cell_value();
        assert_eq!(parse_identifier(&cell), Some(APP_VERSION));
    }

    #[test]
    fn parses_other_versions() {
        assert_eq!(
            parse_identifier("created:tutasks.com version:0.9.2"),
            Some("0.9.2")
        );
    }

    #[test]
    fn rejects_non_identifier_cells() {
        assert_eq!(parse_identifier(""), None);
        assert_eq!(parse_identifier("UID"), None);
        assert_eq!(parse_identifier("created:tutasks.com"), None);
        // The dot is literal, not a wildcard.
        assert_eq!(parse_identifier("created:tutasksXcom version:1.0.0"), None);
        // No leading junk.
        assert_eq!(
            parse_identifier(" created:tutasks.com version:1.0.0"),
            None
        );
    }

    #[test]
    fn parse_is_idempotent() {
        let cell = identifier_cell_value();
        assert_eq!(parse_identifier(&cell), parse_identifier(&cell));
    }
}
