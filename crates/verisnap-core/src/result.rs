//! Analysis result model
//!
//! The single value both analysis endpoints produce and the UI renders. Field
//! names on the wire are fixed (`visualCues`, `riskFactors`,
//! `authenticity_score`) so any client of the HTTP surface can consume them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for both `confidence` and `authenticity_score`.
pub const MAX_SCORE: u8 = 100;

/// Verdict on whether the pictured product is genuine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Prediction {
    #[serde(rename = "Real Product")]
    Real,
    #[serde(rename = "Fake Product")]
    Fake,
}

impl Prediction {
    /// The literal string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "Real Product",
            Self::Fake => "Fake Product",
        }
    }

    /// Parse a provider-supplied label.
    ///
    /// Only the exact string `"Fake Product"` yields [`Prediction::Fake`];
    /// anything else, including case variants, is treated as real.
    pub fn from_label(label: &str) -> Self {
        if label == Self::Fake.as_str() {
            Self::Fake
        } else {
            Self::Real
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, Self::Fake)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supporting evidence attached to a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalysisDetails {
    /// Visual observations, in the order the analyser reported them
    #[serde(rename = "visualCues")]
    pub visual_cues: Vec<String>,
    /// Reasons to doubt authenticity
    #[serde(rename = "riskFactors")]
    pub risk_factors: Vec<String>,
    /// The same judgment on its own 0-100 scale, independent of `confidence`
    pub authenticity_score: u8,
}

/// Result of analysing one product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalysisResult {
    pub prediction: Prediction,
    /// Confidence in the verdict, always within `0..=100`
    pub confidence: u8,
    pub reasoning: String,
    pub details: AnalysisDetails,
}

impl AnalysisResult {
    pub fn is_fake(&self) -> bool {
        self.prediction.is_fake()
    }
}

/// Clamp an arbitrary integer score into `0..=100`.
pub fn clamp_score(value: i64) -> u8 {
    // Bounded by the clamp, so the cast cannot truncate.
    value.clamp(0, i64::from(MAX_SCORE)) as u8
}

/// Round and clamp a floating point score into `0..=100`.
///
/// NaN maps to `None` so callers can substitute their own default.
pub fn clamp_score_f64(value: f64) -> Option<u8> {
    if value.is_nan() {
        return None;
    }
    Some(value.round().clamp(0.0, f64::from(MAX_SCORE)) as u8)
}
