//! Upload/preview session state
//!
//! One [`AnalysisSession`] models everything a single UI tab tracks: the chosen
//! image, its preview, whether an analysis is in flight, the last result or
//! error, drag-and-drop highlighting and the demo toggle. Transitions are plain
//! methods so any front end (the browser page, the CLI) drives the same rules.
//!
//! `analyzing` only rejects a second [`AnalysisSession::begin_analysis`] once the
//! first has been recorded; two front-end events racing ahead of that call are
//! not serialized here.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::provider::image_data_uri;
use crate::report::AnalysisReport;
use crate::result::AnalysisResult;

/// Route of the provider-backed endpoint.
pub const LIVE_ANALYZE_PATH: &str = "/api/analyze";
/// Route of the randomized endpoint.
pub const DEMO_ANALYZE_PATH: &str = "/api/demo-analyze";
/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Shown when a failed analysis carries no message of its own.
pub const GENERIC_ANALYSIS_ERROR: &str = "Failed to analyze image. Please try again.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no image selected")]
    NoImageSelected,

    #[error("an analysis is already in progress")]
    AnalysisInProgress,
}

/// A file picked or dropped by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Which endpoint an analysis is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Live,
    Demo,
}

impl AnalysisMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Live => LIVE_ANALYZE_PATH,
            Self::Demo => DEMO_ANALYZE_PATH,
        }
    }
}

/// What the front end must send once an analysis has begun.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub mode: AnalysisMode,
    pub image: &'a ImageFile,
}

impl AnalysisRequest<'_> {
    pub fn endpoint(&self) -> &'static str {
        self.mode.endpoint()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    selected_image: Option<ImageFile>,
    preview: Option<String>,
    analyzing: bool,
    result: Option<AnalysisResult>,
    error: Option<String>,
    drag_active: bool,
    demo_mode: bool,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_image(&self) -> Option<&ImageFile> {
        self.selected_image.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    pub fn set_demo_mode(&mut self, enabled: bool) {
        self.demo_mode = enabled;
    }

    pub fn mode(&self) -> AnalysisMode {
        if self.demo_mode {
            AnalysisMode::Demo
        } else {
            AnalysisMode::Live
        }
    }

    /// Select a file. Non-image files are ignored and `false` is returned.
    ///
    /// Clears the previous result and error. The preview stays empty until
    /// [`load_preview`](Self::load_preview) completes the read.
    pub fn select_image(&mut self, file: ImageFile) -> bool {
        if !file.is_image() {
            debug!(name = %file.name, mime = %file.mime_type, "Ignoring non-image file");
            return false;
        }
        self.selected_image = Some(file);
        self.preview = None;
        self.result = None;
        self.error = None;
        true
    }

    /// Finish reading the selected image into a data URI preview.
    pub fn load_preview(&mut self) -> Option<&str> {
        let image = self.selected_image.as_ref()?;
        self.preview = Some(image_data_uri(&image.bytes, &image.mime_type));
        self.preview.as_deref()
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_over(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    /// Drop files onto the upload area; only the first file is considered.
    pub fn drop_files(&mut self, files: Vec<ImageFile>) -> bool {
        self.drag_active = false;
        match files.into_iter().next() {
            Some(first) => self.select_image(first),
            None => false,
        }
    }

    /// Start an analysis of the selected image.
    ///
    /// Fails without changing state when nothing is selected or an analysis is
    /// already running.
    pub fn begin_analysis(&mut self) -> Result<AnalysisRequest<'_>, SessionError> {
        if self.analyzing {
            return Err(SessionError::AnalysisInProgress);
        }
        let mode = self.mode();
        let image = self
            .selected_image
            .as_ref()
            .ok_or(SessionError::NoImageSelected)?;
        self.analyzing = true;
        self.error = None;
        Ok(AnalysisRequest { mode, image })
    }

    /// Record the outcome of the request issued after `begin_analysis`.
    ///
    /// On failure the previous result is kept and an empty message is
    /// replaced with [`GENERIC_ANALYSIS_ERROR`].
    pub fn complete_analysis(&mut self, outcome: Result<AnalysisResult, String>) {
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(message) => {
                let message = if message.trim().is_empty() {
                    GENERIC_ANALYSIS_ERROR.to_string()
                } else {
                    message
                };
                self.error = Some(message);
            }
        }
        self.analyzing = false;
    }

    /// Clear the selection, preview and result.
    pub fn remove(&mut self) {
        self.selected_image = None;
        self.preview = None;
        self.result = None;
    }

    /// Build the downloadable report, if there is something to report.
    pub fn download_report(&self, now: DateTime<Utc>) -> Option<AnalysisReport> {
        let result = self.result.as_ref()?;
        let image = self.selected_image.as_ref()?;
        Some(AnalysisReport::new(image.name.clone(), result, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{AnalysisDetails, Prediction};

    fn jpeg(name: &str) -> ImageFile {
        ImageFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
    }

    fn result(prediction: Prediction) -> AnalysisResult {
        AnalysisResult {
            prediction,
            confidence: 80,
            reasoning: "ok".to_string(),
            details: AnalysisDetails {
                visual_cues: vec!["cue".to_string()],
                risk_factors: Vec::new(),
                authenticity_score: 80,
            },
        }
    }

    #[test]
    fn test_select_ignores_non_images() {
        let mut session = AnalysisSession::new();
        assert!(!session.select_image(ImageFile::new("notes.txt", "text/plain", vec![1])));
        assert!(session.selected_image().is_none());
    }

    #[test]
    fn test_select_clears_previous_result_and_error() {
        let mut session = AnalysisSession::new();
        session.select_image(jpeg("a.jpg"));
        session.begin_analysis().unwrap();
        session.complete_analysis(Ok(result(Prediction::Real)));
        session.begin_analysis().unwrap();
        session.complete_analysis(Err("boom".to_string()));
        assert!(session.result().is_some());
        assert_eq!(session.error(), Some("boom"));

        assert!(session.select_image(jpeg("b.jpg")));
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(session.preview().is_none());
        assert_eq!(session.selected_image().unwrap().name, "b.jpg");
    }

    #[test]
    fn test_load_preview_produces_data_uri() {
        let mut session = AnalysisSession::new();
        assert!(session.load_preview().is_none());
        session.select_image(jpeg("a.jpg"));
        let preview = session.load_preview().unwrap();
        assert!(preview.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut session = AnalysisSession::new();
        session.drag_enter();
        assert!(session.is_drag_active());
        session.drag_leave();
        assert!(!session.is_drag_active());
        session.drag_over();
        assert!(session.drop_files(vec![jpeg("first.jpg"), jpeg("second.jpg")]));
        assert!(!session.is_drag_active());
        assert_eq!(session.selected_image().unwrap().name, "first.jpg");
    }

    #[test]
    fn test_drop_without_files_only_clears_highlight() {
        let mut session = AnalysisSession::new();
        session.drag_over();
        assert!(!session.drop_files(Vec::new()));
        assert!(!session.is_drag_active());
        assert!(session.selected_image().is_none());
    }

    #[test]
    fn test_begin_requires_image_and_blocks_overlap() {
        let mut session = AnalysisSession::new();
        assert_eq!(
            session.begin_analysis().unwrap_err(),
            SessionError::NoImageSelected
        );
        assert!(!session.is_analyzing());

        session.select_image(jpeg("a.jpg"));
        session.begin_analysis().unwrap();
        assert!(session.is_analyzing());
        assert_eq!(
            session.begin_analysis().unwrap_err(),
            SessionError::AnalysisInProgress
        );
    }

    #[test]
    fn test_demo_mode_selects_endpoint() {
        let mut session = AnalysisSession::new();
        session.select_image(jpeg("a.jpg"));
        assert_eq!(session.begin_analysis().unwrap().endpoint(), LIVE_ANALYZE_PATH);
        session.complete_analysis(Ok(result(Prediction::Real)));

        session.set_demo_mode(true);
        assert_eq!(session.begin_analysis().unwrap().endpoint(), DEMO_ANALYZE_PATH);
    }

    #[test]
    fn test_failure_keeps_result_and_uses_generic_message() {
        let mut session = AnalysisSession::new();
        session.select_image(jpeg("a.jpg"));
        session.begin_analysis().unwrap();
        session.complete_analysis(Ok(result(Prediction::Fake)));

        session.begin_analysis().unwrap();
        session.complete_analysis(Err(String::new()));
        assert!(!session.is_analyzing());
        assert_eq!(session.error(), Some(GENERIC_ANALYSIS_ERROR));
        assert_eq!(session.result().unwrap().prediction, Prediction::Fake);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut session = AnalysisSession::new();
        session.select_image(jpeg("a.jpg"));
        session.load_preview();
        session.begin_analysis().unwrap();
        session.complete_analysis(Ok(result(Prediction::Real)));

        session.remove();
        assert!(session.selected_image().is_none());
        assert!(session.preview().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_download_report_requires_result_and_image() {
        let now = Utc::now();
        let mut session = AnalysisSession::new();
        assert!(session.download_report(now).is_none());

        session.select_image(jpeg("sneaker.jpg"));
        assert!(session.download_report(now).is_none());

        session.begin_analysis().unwrap();
        let analysed = result(Prediction::Real);
        session.complete_analysis(Ok(analysed.clone()));

        let report = session.download_report(now).unwrap();
        assert_eq!(report.filename, "sneaker.jpg");
        assert_eq!(report.prediction, analysed.prediction);
        assert_eq!(report.confidence, analysed.confidence);
        assert_eq!(report.reasoning, analysed.reasoning);
        assert_eq!(report.details, analysed.details);
    }
}
