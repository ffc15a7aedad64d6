//! Provider construction.
//!
//! The single seam where "which backend" is decided. Callers hand in a
//! provider tag and the opaque authorized client they got from the auth
//! layer; everything past this point is `dyn SpreadsheetProvider` and never
//! branches on provider identity again.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};
use crate::excel::{ExcelConfig, ExcelProvider};
use crate::google::{GoogleSheetsConfig, GoogleSheetsProvider};
use crate::provider::SpreadsheetProvider;

/// Which spreadsheet backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Google Sheets (Sheets v4 + Drive v3).
    GoogleSheets,
    /// Excel Online (Microsoft Graph workbook API).
    ExcelOnline,
}

impl ProviderKind {
    /// The wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoogleSheets => "google-sheets",
            Self::ExcelOnline => "excel-online",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google-sheets" => Ok(Self::GoogleSheets),
            "excel-online" => Ok(Self::ExcelOnline),
            other => Err(ProviderError::configuration(format!(
                "unsupported provider type: {}",
                other
            ))),
        }
    }
}

/// The opaque authenticated client handle supplied by the auth layer.
///
/// Token acquisition and refresh happen upstream; each variant carries only
/// the bearer token the matching backend needs for one request sequence.
#[derive(Debug, Clone)]
pub enum AuthorizedClient {
    /// A Google OAuth2 access token with Sheets and Drive scopes.
    GoogleOauth {
        /// The bearer token.
        access_token: String,
    },
    /// A Microsoft Graph access token with Files scopes.
    MicrosoftGraph {
        /// The bearer token.
        access_token: String,
    },
}

impl AuthorizedClient {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::GoogleOauth { .. } => "google oauth client",
            Self::MicrosoftGraph { .. } => "microsoft graph client",
        }
    }
}

/// Constructs the adapter matching `kind` from an authorized client.
///
/// # Errors
///
/// Returns a configuration error when the client variant does not match the
/// requested kind, or when the adapter's own configuration is invalid.
pub fn create_provider(
    kind: ProviderKind,
    client: AuthorizedClient,
) -> ProviderResult<Box<dyn SpreadsheetProvider>> {
    create_provider_with_timeout(
        kind,
        client,
        Duration::from_secs(GoogleSheetsConfig::DEFAULT_TIMEOUT_SECS),
    )
}

/// Like [`create_provider`], with an explicit request timeout.
pub fn create_provider_with_timeout(
    kind: ProviderKind,
    client: AuthorizedClient,
    timeout: Duration,
) -> ProviderResult<Box<dyn SpreadsheetProvider>> {
    match (kind, client) {
        (ProviderKind::GoogleSheets, AuthorizedClient::GoogleOauth { access_token }) => {
            let config = GoogleSheetsConfig::new(access_token).with_timeout(timeout);
            Ok(Box::new(GoogleSheetsProvider::new(config)?))
        }
        (ProviderKind::ExcelOnline, AuthorizedClient::MicrosoftGraph { access_token }) => {
            let config = ExcelConfig::new(access_token).with_timeout(timeout);
            Ok(Box::new(ExcelProvider::new(config)?))
        }
        (kind, client) => Err(ProviderError::configuration(format!(
            "{} provider requires a matching client, got {}",
            kind,
            client.kind_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    fn google_client() -> AuthorizedClient {
        AuthorizedClient::GoogleOauth {
            access_token: "token".to_string(),
        }
    }

    fn graph_client() -> AuthorizedClient {
        AuthorizedClient::MicrosoftGraph {
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn kind_parses_known_tags() {
        assert_eq!(
            "google-sheets".parse::<ProviderKind>().unwrap(),
            ProviderKind::GoogleSheets
        );
        assert_eq!(
            "excel-online".parse::<ProviderKind>().unwrap(),
            ProviderKind::ExcelOnline
        );
    }

    #[test]
    fn kind_rejects_unknown_tags() {
        let err = "dropbox-paper".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("dropbox-paper"));
    }

    #[test]
    fn kind_round_trips_through_display() {
        for kind in [ProviderKind::GoogleSheets, ProviderKind::ExcelOnline] {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn constructs_matching_pairs() {
        let google = create_provider(ProviderKind::GoogleSheets, google_client()).unwrap();
        assert_eq!(google.name(), "google-sheets");

        let excel = create_provider(ProviderKind::ExcelOnline, graph_client()).unwrap();
        assert_eq!(excel.name(), "excel-online");
    }

    #[test]
    fn rejects_mismatched_pairs() {
        let err = create_provider(ProviderKind::GoogleSheets, graph_client())
            .err()
            .unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("google-sheets"));
        assert!(err.message().contains("microsoft graph"));

        let err = create_provider(ProviderKind::ExcelOnline, google_client())
            .err()
            .unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }
}
