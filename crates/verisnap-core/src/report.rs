//! Downloadable analysis report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::{AnalysisDetails, AnalysisResult, Prediction};

/// JSON document offered for download after a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// When the report was generated (ISO-8601)
    pub timestamp: DateTime<Utc>,
    /// Name of the analysed file as the user selected it
    pub filename: String,
    pub prediction: Prediction,
    pub confidence: u8,
    pub reasoning: String,
    pub details: AnalysisDetails,
}

impl AnalysisReport {
    pub fn new(filename: impl Into<String>, result: &AnalysisResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            filename: filename.into(),
            prediction: result.prediction,
            confidence: result.confidence,
            reasoning: result.reasoning.clone(),
            details: result.details.clone(),
        }
    }

    /// Download file name, unique per millisecond of `timestamp`.
    pub fn file_name(&self) -> String {
        report_file_name(self.timestamp)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `authenticity-report-<unix millis>.json`
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("authenticity-report-{}.json", now.timestamp_millis())
}
