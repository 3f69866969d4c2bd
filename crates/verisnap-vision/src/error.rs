//! Vision client error types

use thiserror::Error;

/// Result type for vision client operations
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors raised while asking the provider to analyse an image
///
/// Display strings are what the HTTP layer classifies, so the credential,
/// quota and rate-limit variants keep those words in their messages.
#[derive(Debug, Error)]
pub enum VisionError {
    /// Base URL could not be parsed or joined
    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// Transport failure before a response arrived
    #[error("Provider connection error: {0}")]
    Connection(String),

    /// The configured per-request timeout elapsed
    #[error("Provider request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// HTTP 401 from the provider
    #[error("Invalid API key: {message}")]
    Unauthorized { message: String },

    /// HTTP 429 from the provider; the message tells quota from throttling
    #[error("Provider rate limit response: {message}")]
    TooManyRequests { message: String },

    /// Any other non-success status
    #[error("Provider error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Body was not a chat completion
    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    /// A completion with no text in it
    #[error("Provider returned no analysis content")]
    EmptyResponse,
}

impl VisionError {
    /// Build the error for a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized { message },
            429 => Self::TooManyRequests { message },
            _ => Self::Api { status, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verisnap_core::ProviderFailure;

    fn classify(err: VisionError) -> ProviderFailure {
        ProviderFailure::classify(&err.to_string())
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            VisionError::from_status(401, "nope"),
            VisionError::Unauthorized { .. }
        ));
        assert!(matches!(
            VisionError::from_status(429, "slow down"),
            VisionError::TooManyRequests { .. }
        ));
        assert!(matches!(
            VisionError::from_status(503, "overloaded"),
            VisionError::Api { status: 503, .. }
        ));
    }

    #[test]
    fn test_messages_classify_as_expected() {
        assert_eq!(
            classify(VisionError::from_status(401, "bad token")),
            ProviderFailure::InvalidCredential
        );
        assert_eq!(
            classify(VisionError::from_status(429, "You exceeded your current quota")),
            ProviderFailure::QuotaExceeded
        );
        assert_eq!(
            classify(VisionError::from_status(429, "Too many requests")),
            ProviderFailure::RateLimited
        );
        assert_eq!(
            classify(VisionError::EmptyResponse),
            ProviderFailure::Other
        );
    }
}
