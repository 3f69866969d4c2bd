//! Randomized demo analysis
//!
//! Produces plausible-looking results without looking at the image, so the UI
//! can be exercised without provider credentials. Results are not reproducible
//! across calls.

use rand::Rng;
use std::time::Duration;

use crate::result::{AnalysisDetails, AnalysisResult, Prediction};

/// Simulated provider latency.
pub const DEFAULT_DEMO_DELAY: Duration = Duration::from_millis(2000);

/// Probability that a demo result is "Fake Product".
pub const FAKE_PROBABILITY: f64 = 0.4;

/// Inclusive confidence range for demo results.
pub const CONFIDENCE_RANGE: std::ops::RangeInclusive<u8> = 70..=100;

const FAKE_REASONING: &str = "The product shows several indicators commonly associated with counterfeit goods, including inconsistencies in branding and build quality.";
const FAKE_CUES: [&str; 3] = [
    "Inconsistent logo placement",
    "Irregular stitching patterns",
    "Color variations from the original design",
];
const FAKE_RISKS: [&str; 3] = [
    "Logo font differs from the authentic version",
    "Materials appear lower quality than expected",
    "Packaging details do not match the manufacturer's standards",
];

const REAL_REASONING: &str = "The product displays characteristics consistent with authentic merchandise, including accurate branding and high-quality construction.";
const REAL_CUES: [&str; 3] = [
    "Consistent brand logo and typography",
    "Precise stitching and finishing",
    "Material texture matches genuine products",
];

/// Draw a random demo result.
///
/// `authenticity_score` mirrors confidence: equal to it for real products and
/// `100 - confidence` for fakes.
pub fn generate_demo_result<R: Rng>(rng: &mut R) -> AnalysisResult {
    let is_fake = rng.random_bool(FAKE_PROBABILITY);
    let confidence = rng.random_range(CONFIDENCE_RANGE);

    let to_strings = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();

    if is_fake {
        AnalysisResult {
            prediction: Prediction::Fake,
            confidence,
            reasoning: FAKE_REASONING.to_string(),
            details: AnalysisDetails {
                visual_cues: to_strings(&FAKE_CUES),
                risk_factors: to_strings(&FAKE_RISKS),
                authenticity_score: 100 - confidence,
            },
        }
    } else {
        AnalysisResult {
            prediction: Prediction::Real,
            confidence,
            reasoning: REAL_REASONING.to_string(),
            details: AnalysisDetails {
                visual_cues: to_strings(&REAL_CUES),
                risk_factors: Vec::new(),
                authenticity_score: confidence,
            },
        }
    }
}
