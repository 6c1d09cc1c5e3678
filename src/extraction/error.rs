//! Error types for the text-extraction service.

use thiserror::Error;

/// Result type for extraction-service calls.
pub type Result<T> = std::result::Result<T, ExtractionServiceError>;

/// A single failed call to the text-extraction service.
///
/// Rate limits and timeouts are told apart from every other failure so the
/// retry loop can treat them differently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionServiceError {
    /// HTTP 429 from the service
    #[error("Rate limited by extraction service: {0}")]
    RateLimited(String),

    /// The request did not complete within its timeout
    #[error("Extraction request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Any other non-2xx response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection failed before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// The service answered without any completion text
    #[error("Extraction service returned an empty response")]
    EmptyResponse,
}

impl ExtractionServiceError {
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.is_rate_limit() || self.is_timeout()
    }
}
