//! Excel Online adapter configuration.

use std::time::Duration;

/// Configuration for the Excel Online adapter.
///
/// The access token comes from the auth layer above. The base URL is
/// overridable so tests can point the client at a local server.
#[derive(Debug, Clone)]
pub struct ExcelConfig {
    /// Microsoft Graph access token, already authorized for Files scopes.
    pub access_token: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Base URL for the Microsoft Graph API.
    pub graph_base_url: String,
}

impl ExcelConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Production Graph API base.
    pub const GRAPH_API_BASE: &'static str = "https://graph.microsoft.com/v1.0";

    /// Creates a configuration with the given access token and defaults.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            graph_base_url: Self::GRAPH_API_BASE.to_string(),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the Graph API base URL (for tests).
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.graph_base_url = base.into();
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
        let config = ExcelConfig::new("token");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.graph_base_url.contains("graph.microsoft.com"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_token() {
        assert!(ExcelConfig::new("").validate().is_err());
    }
}
