//! Error types for proxy operations.
//!
//! This module defines [`DartError`] which covers every failure the proxy can
//! report: malformed input, authentication, unknown tickers, upstream
//! failures and startup problems.

use thiserror::Error;

/// Errors that can occur while resolving, listing or paging disclosure data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DartError {
    /// A request parameter was malformed or out of range.
    #[error("{0}")]
    InvalidInput(String),

    /// The inbound credential is missing or malformed.
    #[error("{0}")]
    Unauthenticated(String),

    /// The inbound credential was presented but rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// The ticker is absent from the current corp-code snapshot.
    #[error("Unknown stock_code: {0}")]
    NotFound(String),

    /// OpenDART answered with an embedded status outside the accepted set.
    #[error("OpenDART status={status} message={message}")]
    Upstream {
        /// Embedded status code (e.g. `"020"`).
        status: String,
        /// Embedded human-readable message.
        message: String,
    },

    /// Transport failure, timeout or non-success HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream payload could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The corp-code archive was unusable (no XML document, or no records).
    #[error("Corrupt corp-code manifest: {0}")]
    CorruptManifest(String),

    /// Startup configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DartError {
    /// Returns true for failures attributable to the upstream service.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::Network(_) | Self::Parse(_) | Self::CorruptManifest(_)
        )
    }
}

/// Result type alias using [`DartError`].
pub type Result<T> = std::result::Result<T, DartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_format() {
        let err = DartError::Upstream {
            status: "020".to_string(),
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "OpenDART status=020 message=rate limited");
        assert!(err.is_upstream());
    }

    #[test]
    fn test_not_found_is_not_upstream() {
        let err = DartError::NotFound("005930".to_string());
        assert_eq!(err.to_string(), "Unknown stock_code: 005930");
        assert!(!err.is_upstream());
    }
}
