//! Error types for spreadsheet provider operations.
//!
//! Both backends fold their failures into one [`ProviderError`] type so the
//! caller never branches on provider identity. The one condition callers do
//! branch on - a task uid absent from its month partition - gets its own
//! [`ProviderErrorCode::TaskNotFound`] code, distinct from a remote 404.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Authentication failed - the access token is invalid or expired.
    AuthenticationFailed,
    /// Authorization failed - the user lacks permission on the document.
    AuthorizationFailed,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// Rate limit exceeded - too many requests.
    RateLimited,
    /// Server returned an error (5xx status codes).
    ServerError,
    /// Invalid response from the server - parse error, unexpected format.
    InvalidResponse,
    /// Remote resource not found (404) - document or worksheet missing.
    NotFound,
    /// The targeted task uid is absent from its month partition.
    TaskNotFound,
    /// Request was invalid (400) - bad parameters, malformed id.
    BadRequest,
    /// Configuration error - missing or invalid config, mismatched factory
    /// inputs.
    ConfigurationError,
    /// Worksheet/tab creation or header write failed partway.
    ProvisioningError,
    /// Internal provider error - unexpected state, bug.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns true if this error is transient and the operation may be
    /// retried. Retry policy itself belongs to the transport/auth layer
    /// above; this layer never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::TaskNotFound => "task_not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::ProvisioningError => "provisioning_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while interacting with a spreadsheet backend.
#[derive(Debug, Error)]
pub struct ProviderError {
    /// The error code categorizing this error.
    code: ProviderErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The provider that generated this error ("google-sheets" or
    /// "excel-online").
    provider: Option<String>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a remote not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates a task-not-found error for the given uid.
    pub fn task_not_found(uid: &str) -> Self {
        Self::new(
            ProviderErrorCode::TaskNotFound,
            format!("task not found: {}", uid),
        )
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates a provisioning error.
    pub fn provisioning(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ProvisioningError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true if this is the task-not-found condition callers branch
    /// on (stale UI state rather than an outage).
    pub fn is_task_not_found(&self) -> bool {
        self.code == ProviderErrorCode::TaskNotFound
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_retryable() {
        assert!(ProviderErrorCode::NetworkError.is_retryable());
        assert!(ProviderErrorCode::RateLimited.is_retryable());
        assert!(ProviderErrorCode::ServerError.is_retryable());
        assert!(!ProviderErrorCode::TaskNotFound.is_retryable());
        assert!(!ProviderErrorCode::ProvisioningError.is_retryable());
    }

    #[test]
    fn task_not_found_is_distinct() {
        let err = ProviderError::task_not_found("abc123");
        assert!(err.is_task_not_found());
        assert_eq!(err.code(), ProviderErrorCode::TaskNotFound);
        assert!(err.message().contains("abc123"));

        let remote = ProviderError::not_found("worksheet missing");
        assert!(!remote.is_task_not_found());
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::rate_limited("too many requests").with_provider("excel-online");
        let display = format!("{}", err);
        assert!(display.contains("[excel-online]"));
        assert!(display.contains("rate_limited"));
        assert!(display.contains("too many requests"));
    }

    #[test]
    fn provider_error_with_source() {
        use std::error::Error;
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProviderError::invalid_response("bad body").with_source(parse_err);
        assert!(err.source().is_some());
    }
}
