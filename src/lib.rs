//! verisnap: upload a product photo, get a Real/Fake judgment.
//!
//! This facade re-exports the workspace crates so applications can depend on
//! a single package.

pub use verisnap_core as core;
pub use verisnap_http as http;
pub use verisnap_vision as vision;

pub use verisnap_core::{
    AnalysisDetails, AnalysisReport, AnalysisResult, AnalysisSession, ImageFile, Prediction,
    VisionProvider,
};
pub use verisnap_http::{AnalysisRuntime, RuntimeConfig, RuntimeConfigBuilder};
pub use verisnap_vision::{OpenAiConfig, OpenAiVisionClient};
