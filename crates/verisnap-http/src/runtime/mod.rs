//! # Runtime Module
//!
//! The axum application serving the analysis endpoints, the browser page and
//! the API documentation.
//!
//! ## Usage Pattern
//!
//! ```no_run
//! use verisnap_http::runtime::{AnalysisRuntime, RuntimeConfigBuilder, shutdown_signal};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RuntimeConfigBuilder::from_env()?.build()?;
//! let app = AnalysisRuntime::from_config(config)?.router();
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app)
//!     .with_graceful_shutdown(shutdown_signal())
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// Environment-based configuration.
pub mod config;
/// API documentation endpoints.
pub mod docs;
/// Error responses and request ids.
pub mod error;
/// HTTP request handlers organized by functionality.
pub mod handlers;
/// Runtime state shared by all handlers.
pub mod http;
/// HTTP router configuration and route registration.
pub mod router;
/// Graceful shutdown on process signals.
pub mod shutdown;
/// Multipart image extraction.
pub mod upload;

pub use config::{ConfigError, RuntimeConfig, RuntimeConfigBuilder};
pub use docs::ApiDoc;
pub use error::{ErrorCode, ErrorResponse, RequestId, RuntimeError, RuntimeErrorKind, RuntimeResult};
pub use http::AnalysisRuntime;
pub use shutdown::shutdown_signal;
pub use upload::UploadedImage;
