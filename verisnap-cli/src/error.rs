//! CLI error type

use thiserror::Error;
use verisnap_core::SessionError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] verisnap_http::ConfigError),

    #[error("Failed to set up vision provider: {0}")]
    Provider(#[from] verisnap_vision::VisionError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),

    #[error("{path} is not an image (detected {mime_type})")]
    NotAnImage { path: String, mime_type: String },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
