//! Error handling for the HTTP runtime
//!
//! Every failure is caught at the endpoint boundary and turned into a JSON body
//! `{error, code, request_id}` with a matching status code. The `error` field is
//! the message the browser shows, so it is always non-empty.

use axum::{
    extract::{FromRequestParts, Request},
    http::{
        StatusCode,
        header::{self, HeaderValue},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, convert::Infallible, fmt};
use utoipa::ToSchema;
use verisnap_core::ProviderFailure;

/// Maximum length for client-provided request IDs
const MAX_REQUEST_ID_LENGTH: usize = 128;

tokio::task_local! {
    /// Id of the request being served, for code that has no access to the request
    static CURRENT_REQUEST_ID: RequestId;
}

/// Correlation id attached to every request and error response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random request ID using UUID v4
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accept a client-provided id if it is safe to log and echo back.
    pub fn parse(id: &str) -> Option<Self> {
        validate_request_id(id).then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the request currently inside [`request_id_middleware`], if any.
    pub fn current() -> Option<Self> {
        CURRENT_REQUEST_ID.try_with(Clone::clone).ok()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty, bounded, alphanumerics plus `-` and `_` only.
///
/// Colons and control characters are rejected so ids cannot forge log fields.
fn validate_request_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_REQUEST_ID_LENGTH
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Middleware that generates or extracts request IDs
///
/// - Uses a valid `X-Request-ID` header when the client sent one
/// - Generates a UUID otherwise
/// - Stores the ID in request extensions for handlers
/// - Echoes the ID in the response `X-Request-ID` header
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(RequestId::parse)
        .unwrap_or_else(RequestId::generate);

    request.extensions_mut().insert(request_id.clone());

    let mut response = CURRENT_REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;

    if let Ok(header_value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(
            header::HeaderName::from_static("x-request-id"),
            header_value,
        );
    }

    response
}

/// Handlers take the id as an extractor; outside the middleware a fresh one is made.
impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(RequestId::generate))
    }
}

/// Response for a handler that panicked; used with `CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    let request_id = RequestId::current().unwrap_or_else(RequestId::generate);
    RuntimeError::internal(format!("handler panicked: {detail}"), request_id).into_response()
}

/// Machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No `image` field in the multipart body
    MissingImage,
    /// Image exceeds the configured size cap
    ImageTooLarge,
    /// No provider credential configured
    ProviderNotConfigured,
    /// Provider rejected the credential
    InvalidCredential,
    /// Provider account is out of quota
    QuotaExceeded,
    /// Provider throttled the request
    RateLimited,
    /// Provider failed for another reason
    ProviderError,
    /// Body could not be read as multipart
    InvalidMultipart,
    /// Anything unexpected
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingImage => "missing_image",
            Self::ImageTooLarge => "image_too_large",
            Self::ProviderNotConfigured => "provider_not_configured",
            Self::InvalidCredential => "invalid_credential",
            Self::QuotaExceeded => "quota_exceeded",
            Self::RateLimited => "rate_limited",
            Self::ProviderError => "provider_error",
            Self::InvalidMultipart => "invalid_multipart",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body returned by both analysis endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message, shown as-is by the UI
    pub error: String,
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Request ID for tracking and debugging
    pub request_id: RequestId,
}

#[derive(Debug, Clone)]
pub enum RuntimeErrorKind {
    MissingImage,
    /// `size` is unknown when reading stopped at the limit
    ImageTooLarge { size: Option<usize>, limit: usize },
    ProviderNotConfigured,
    Provider {
        failure: ProviderFailure,
        cause: String,
    },
    InvalidMultipart { reason: String },
    Internal { reason: String },
}

/// Endpoint failure tagged with the request it belongs to
#[derive(Debug)]
pub struct RuntimeError {
    pub request_id: RequestId,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, request_id: RequestId) -> Self {
        Self { request_id, kind }
    }

    pub fn missing_image(request_id: RequestId) -> Self {
        Self::new(RuntimeErrorKind::MissingImage, request_id)
    }

    pub fn image_too_large(size: Option<usize>, limit: usize, request_id: RequestId) -> Self {
        Self::new(RuntimeErrorKind::ImageTooLarge { size, limit }, request_id)
    }

    pub fn provider_not_configured(request_id: RequestId) -> Self {
        Self::new(RuntimeErrorKind::ProviderNotConfigured, request_id)
    }

    /// Classify a provider failure from its message text.
    pub fn provider(cause: impl Into<String>, request_id: RequestId) -> Self {
        let cause = cause.into();
        Self::new(
            RuntimeErrorKind::Provider {
                failure: ProviderFailure::classify(&cause),
                cause,
            },
            request_id,
        )
    }

    pub fn invalid_multipart(reason: impl Into<String>, request_id: RequestId) -> Self {
        Self::new(
            RuntimeErrorKind::InvalidMultipart {
                reason: reason.into(),
            },
            request_id,
        )
    }

    pub fn internal(reason: impl Into<String>, request_id: RequestId) -> Self {
        Self::new(
            RuntimeErrorKind::Internal {
                reason: reason.into(),
            },
            request_id,
        )
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn kind(&self) -> &RuntimeErrorKind {
        &self.kind
    }

    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            RuntimeErrorKind::MissingImage => ErrorCode::MissingImage,
            RuntimeErrorKind::ImageTooLarge { .. } => ErrorCode::ImageTooLarge,
            RuntimeErrorKind::ProviderNotConfigured => ErrorCode::ProviderNotConfigured,
            RuntimeErrorKind::Provider { failure, .. } => match failure {
                ProviderFailure::InvalidCredential => ErrorCode::InvalidCredential,
                ProviderFailure::QuotaExceeded => ErrorCode::QuotaExceeded,
                ProviderFailure::RateLimited => ErrorCode::RateLimited,
                ProviderFailure::Other => ErrorCode::ProviderError,
            },
            RuntimeErrorKind::InvalidMultipart { .. } => ErrorCode::InvalidMultipart,
            RuntimeErrorKind::Internal { .. } => ErrorCode::InternalError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.kind {
            RuntimeErrorKind::MissingImage
            | RuntimeErrorKind::ImageTooLarge { .. }
            | RuntimeErrorKind::InvalidMultipart { .. } => StatusCode::BAD_REQUEST,
            RuntimeErrorKind::Provider { failure, .. } => match failure {
                ProviderFailure::InvalidCredential => StatusCode::UNAUTHORIZED,
                ProviderFailure::QuotaExceeded | ProviderFailure::RateLimited => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                ProviderFailure::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RuntimeErrorKind::ProviderNotConfigured | RuntimeErrorKind::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message for the end user. Internal reasons are never included.
    pub fn user_message(&self) -> String {
        match &self.kind {
            RuntimeErrorKind::MissingImage => "No image provided".to_string(),
            RuntimeErrorKind::ImageTooLarge { limit, .. } => {
                format!("Image size must be less than {}", format_limit(*limit))
            }
            RuntimeErrorKind::ProviderNotConfigured => "OpenAI API key not configured".to_string(),
            RuntimeErrorKind::Provider { failure, cause } => failure.user_message(cause),
            RuntimeErrorKind::InvalidMultipart { .. } => {
                "Invalid upload. Send the image as multipart/form-data.".to_string()
            }
            RuntimeErrorKind::Internal { .. } => "Internal server error".to_string(),
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.user_message(),
            code: self.error_code(),
            request_id: self.request_id.clone(),
        }
    }
}

/// `20MB` for whole mebibytes, raw bytes otherwise.
fn format_limit(limit: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else {
        format!("{limit} bytes")
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuntimeErrorKind::MissingImage => write!(f, "Missing image field"),
            RuntimeErrorKind::ImageTooLarge {
                size: Some(size),
                limit,
            } => write!(f, "Image too large: {size} bytes exceeds {limit}"),
            RuntimeErrorKind::ImageTooLarge { size: None, limit } => {
                write!(f, "Image too large: exceeds {limit} bytes")
            }
            RuntimeErrorKind::ProviderNotConfigured => write!(f, "Provider not configured"),
            RuntimeErrorKind::Provider { failure, cause } => {
                write!(f, "Provider failure ({failure}): {cause}")
            }
            RuntimeErrorKind::InvalidMultipart { reason } => {
                write!(f, "Invalid multipart body: {reason}")
            }
            RuntimeErrorKind::Internal { reason } => write!(f, "Internal server error: {reason}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl IntoResponse for RuntimeError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(
                error_code = %self.error_code(),
                request_id = %self.request_id,
                status_code = %status_code,
                error_message = %self,
                "Analysis request failed"
            );
        } else {
            tracing::warn!(
                error_code = %self.error_code(),
                request_id = %self.request_id,
                status_code = %status_code,
                error_message = %self,
                "Analysis request rejected"
            );
        }

        (status_code, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias for HTTP runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
