//! Google Sheets adapter configuration.

use std::time::Duration;

/// Configuration for the Google Sheets adapter.
///
/// The access token comes from the auth layer above; token acquisition and
/// refresh are out of scope for the adapters. Base URLs are overridable so
/// tests can point the client at a local server.
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    /// OAuth access token, already authorized for Sheets and Drive scopes.
    pub access_token: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Base URL for the Sheets v4 API.
    pub sheets_base_url: String,

    /// Base URL for the Drive v3 API.
    pub drive_base_url: String,
}

impl GoogleSheetsConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Production Sheets API base.
    pub const SHEETS_API_BASE: &'static str = "https://sheets.googleapis.com/v4";

    /// Production Drive API base.
    pub const DRIVE_API_BASE: &'static str = "https://www.googleapis.com/drive/v3";

    /// Creates a configuration with the given access token and defaults.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            sheets_base_url: Self::SHEETS_API_BASE.to_string(),
            drive_base_url: Self::DRIVE_API_BASE.to_string(),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides both API base URLs (for tests).
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.sheets_base_url = base.clone();
        self.drive_base_url = base;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_token.trim().is_empty() {
            return Err("access token must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GoogleSheetsConfig::new("token");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.sheets_base_url.contains("sheets.googleapis.com"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_token() {
        let config = GoogleSheetsConfig::new("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn base_url_override() {
        let config = GoogleSheetsConfig::new("token").with_base_url("http://localhost:9999");
        assert_eq!(config.sheets_base_url, "http://localhost:9999");
        assert_eq!(config.drive_base_url, "http://localhost:9999");
    }
}
