//! Vision provider capability
//!
//! The analysis endpoint only needs one thing from a model vendor: given image
//! bytes and their MIME type, return free-form text. Keeping that behind
//! [`VisionProvider`] lets interpretation be tested without the network.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::fmt;
use thiserror::Error;

/// MIME type assumed when an upload does not declare an image type.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Instruction sent alongside every image.
pub const ANALYSIS_PROMPT: &str = r#"You are an expert in product authentication and counterfeit detection. Analyze this product image and decide whether it shows a genuine product or a counterfeit.

Examine logo placement and quality, fonts and printing, stitching and finishing, materials, colors, packaging, labels and serial numbers, and any other visual cue that distinguishes authentic goods from fakes.

Respond with a JSON object in exactly this format:
{
  "prediction": "Real Product" or "Fake Product",
  "confidence": <integer from 0 to 100>,
  "reasoning": "<explanation of your judgment>",
  "details": {
    "visualCues": ["<observed cue>", "..."],
    "riskFactors": ["<reason for doubt>", "..."],
    "authenticity_score": <integer from 0 to 100>
  }
}"#;

/// Error reported by a provider implementation.
///
/// Only the message text matters to callers: [`ProviderFailure::classify`]
/// derives the HTTP status from it.
#[derive(Debug)]
pub struct ProviderError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct MessageError(String);

impl ProviderError {
    /// Wrap a concrete provider error.
    pub fn new(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(error))
    }

    /// Build an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// Classify this error for the HTTP surface.
    pub fn failure(&self) -> ProviderFailure {
        ProviderFailure::classify(&self.to_string())
    }
}

/// A vision-capable model that turns an image into analysis text.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Analyse `image` and return the model's raw text answer.
    ///
    /// Implementations make a single attempt; an empty answer is an error.
    async fn analyze_image(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError>;

    /// Short identifier used in logs, e.g. `"openai:gpt-4o"`.
    fn name(&self) -> String;
}

/// Classification of a provider failure, derived from its message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The credential was rejected
    InvalidCredential,
    /// The account ran out of quota
    QuotaExceeded,
    /// The provider throttled the request
    RateLimited,
    /// Anything else
    Other,
}

impl ProviderFailure {
    /// Classify by case-insensitive substring match on the error text.
    ///
    /// Checked in order: `"api key"`, `"quota"`, `"rate limit"`.
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("api key") {
            Self::InvalidCredential
        } else if lowered.contains("quota") {
            Self::QuotaExceeded
        } else if lowered.contains("rate limit") {
            Self::RateLimited
        } else {
            Self::Other
        }
    }

    /// Message shown to the end user.
    pub fn user_message(&self, cause: &str) -> String {
        match self {
            Self::InvalidCredential => "Invalid OpenAI API key".to_string(),
            Self::QuotaExceeded => "OpenAI API quota exceeded".to_string(),
            Self::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            Self::Other => format!("Analysis failed: {cause}"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid_credential",
            Self::QuotaExceeded => "quota_exceeded",
            Self::RateLimited => "rate_limited",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the MIME type to embed in a data URI.
///
/// Declared `image/*` types are kept; anything else falls back to
/// [`DEFAULT_IMAGE_MIME`].
pub fn image_mime_type(declared: Option<&str>) -> &str {
    match declared.map(str::trim) {
        Some(mime) if mime.len() > "image/".len() && mime.starts_with("image/") => mime,
        _ => DEFAULT_IMAGE_MIME,
    }
}

/// Encode image bytes as a `data:<mime>;base64,` URI.
pub fn image_data_uri(image: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_invalid_credential() {
        assert_eq!(
            ProviderFailure::classify("Incorrect API key provided: sk-abc***"),
            ProviderFailure::InvalidCredential
        );
    }

    #[test]
    fn test_classify_quota_and_rate_limit() {
        assert_eq!(
            ProviderFailure::classify("You exceeded your current quota, please check your plan"),
            ProviderFailure::QuotaExceeded
        );
        assert_eq!(
            ProviderFailure::classify("Rate limit reached for gpt-4o in organization org-x"),
            ProviderFailure::RateLimited
        );
    }

    #[test]
    fn test_classify_credential_wins_over_quota() {
        assert_eq!(
            ProviderFailure::classify("API key has no quota"),
            ProviderFailure::InvalidCredential
        );
    }

    #[test]
    fn test_classify_other_message_includes_cause() {
        let failure = ProviderFailure::classify("connection reset by peer");
        assert_eq!(failure, ProviderFailure::Other);
        assert_eq!(
            failure.user_message("connection reset by peer"),
            "Analysis failed: connection reset by peer"
        );
    }

    #[test]
    fn test_credential_message_mentions_api_key() {
        assert!(
            ProviderFailure::InvalidCredential
                .user_message("")
                .contains("API key")
        );
    }

    #[test]
    fn test_provider_error_classifies_wrapped_message() {
        let err = ProviderError::msg("You exceeded your current quota");
        assert_eq!(err.failure(), ProviderFailure::QuotaExceeded);
        assert_eq!(err.to_string(), "You exceeded your current quota");
    }

    #[test]
    fn test_image_mime_type_fallback() {
        assert_eq!(image_mime_type(Some("image/png")), "image/png");
        assert_eq!(image_mime_type(Some("image/")), DEFAULT_IMAGE_MIME);
        assert_eq!(image_mime_type(Some("application/pdf")), DEFAULT_IMAGE_MIME);
        assert_eq!(image_mime_type(None), DEFAULT_IMAGE_MIME);
    }

    #[test]
    fn test_image_data_uri() {
        assert_eq!(
            image_data_uri(b"abc", "image/webp"),
            "data:image/webp;base64,YWJj"
        );
    }
}
