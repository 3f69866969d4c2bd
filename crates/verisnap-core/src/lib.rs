//! # verisnap core
//!
//! Domain types and pure logic shared by the verisnap HTTP runtime and CLI:
//!
//! - **Result model**: [`AnalysisResult`] and its wire format
//! - **Interpretation**: turning free-form provider text into a result
//! - **Provider seam**: the [`VisionProvider`] capability and failure classification
//! - **Demo**: randomized results for credential-free use
//! - **Session**: the upload/preview state machine and report export

pub mod demo;
pub mod interpret;
pub mod provider;
pub mod report;
pub mod result;
pub mod session;

pub use demo::{DEFAULT_DEMO_DELAY, generate_demo_result};
pub use interpret::{
    InterpretationPath, classify_by_keyword, extract_embedded_json, interpret_provider_text,
    normalize_candidate,
};
pub use provider::{
    ANALYSIS_PROMPT, ProviderError, ProviderFailure, VisionProvider, image_data_uri,
    image_mime_type,
};
pub use report::{AnalysisReport, report_file_name};
pub use result::{AnalysisDetails, AnalysisResult, Prediction};
pub use session::{
    AnalysisMode, AnalysisRequest, AnalysisSession, DEMO_ANALYZE_PATH, IMAGE_FIELD, ImageFile,
    LIVE_ANALYZE_PATH, SessionError,
};
