//! Provider response interpretation
//!
//! Vision models are asked for a JSON object but frequently wrap it in prose or
//! ignore the instruction entirely. Interpretation happens in two explicit steps:
//!
//! 1. [`extract_embedded_json`] pulls the outermost `{...}` span out of the text.
//! 2. [`normalize_candidate`] validates each documented field and fills defaults.
//!
//! When step 1 finds nothing usable, [`classify_by_keyword`] builds a result from
//! the raw text instead, so interpretation never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::result::{AnalysisDetails, AnalysisResult, Prediction, clamp_score, clamp_score_f64};

/// Confidence used when the provider omits one.
pub const DEFAULT_CONFIDENCE: u8 = 50;

/// Confidence assigned to every keyword-classified result.
pub const FALLBACK_CONFIDENCE: u8 = 75;

pub const DEFAULT_REASONING: &str = "Analysis completed successfully";
pub const DEFAULT_VISUAL_CUE: &str = "General product appearance analyzed";
pub const FALLBACK_VISUAL_CUE: &str = "AI provided text analysis instead of structured data";
pub const FALLBACK_RISK_FACTOR: &str = "Potential authenticity concerns mentioned in analysis";

/// Greedy: first `{` through last `}`, across newlines.
static EMBEDDED_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("embedded object pattern is valid"));

static COUNTERFEIT_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)fake|counterfeit|replica").expect("counterfeit keyword pattern is valid")
});

/// Which interpretation path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretationPath {
    /// A JSON object was found and normalized
    Structured,
    /// No usable JSON; classified by keyword
    Fallback,
}

/// Locate and parse a JSON object embedded anywhere in `text`.
///
/// Returns `None` when there is no brace span, when the span does not parse,
/// or when it parses to something other than an object.
pub fn extract_embedded_json(text: &str) -> Option<Map<String, Value>> {
    let span = EMBEDDED_OBJECT.find(text)?;
    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            debug!(kind = json_kind(&other), "Embedded JSON is not an object");
            None
        }
        Err(e) => {
            debug!(error = %e, "Embedded JSON span failed to parse");
            None
        }
    }
}

/// Build a result from free text by looking for counterfeit keywords.
///
/// The whole text becomes the reasoning. Risk factors come only from the
/// keyword match, never from anything the provider may have listed.
pub fn classify_by_keyword(text: &str) -> AnalysisResult {
    let prediction = if COUNTERFEIT_KEYWORDS.is_match(text) {
        Prediction::Fake
    } else {
        Prediction::Real
    };

    let (risk_factors, authenticity_score) = match prediction {
        Prediction::Fake => (vec![FALLBACK_RISK_FACTOR.to_string()], 25),
        Prediction::Real => (Vec::new(), 75),
    };

    AnalysisResult {
        prediction,
        confidence: FALLBACK_CONFIDENCE,
        reasoning: text.to_string(),
        details: AnalysisDetails {
            visual_cues: vec![FALLBACK_VISUAL_CUE.to_string()],
            risk_factors,
            authenticity_score,
        },
    }
}

/// Coerce a loosely-typed candidate object into a strict [`AnalysisResult`].
pub fn normalize_candidate(candidate: &Map<String, Value>) -> AnalysisResult {
    let prediction = candidate
        .get("prediction")
        .and_then(Value::as_str)
        .map(Prediction::from_label)
        .unwrap_or(Prediction::Real);

    let confidence = candidate
        .get("confidence")
        .and_then(score_value)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let reasoning = candidate
        .get("reasoning")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REASONING)
        .to_string();

    let details = candidate.get("details").and_then(Value::as_object);

    let visual_cues = details
        .and_then(|d| d.get("visualCues"))
        .and_then(string_list)
        .unwrap_or_else(|| vec![DEFAULT_VISUAL_CUE.to_string()]);

    let risk_factors = details
        .and_then(|d| d.get("riskFactors"))
        .and_then(string_list)
        .unwrap_or_default();

    let authenticity_score = details
        .and_then(|d| d.get("authenticity_score"))
        .and_then(score_value)
        .unwrap_or(confidence);

    AnalysisResult {
        prediction,
        confidence,
        reasoning,
        details: AnalysisDetails {
            visual_cues,
            risk_factors,
            authenticity_score,
        },
    }
}

/// Turn raw provider text into a result, reporting which path was taken.
pub fn interpret_provider_text(text: &str) -> (AnalysisResult, InterpretationPath) {
    match extract_embedded_json(text) {
        Some(candidate) => (
            normalize_candidate(&candidate),
            InterpretationPath::Structured,
        ),
        None => (classify_by_keyword(text), InterpretationPath::Fallback),
    }
}

/// Accepts integers, floats and numeric strings.
fn score_value(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(clamp_score(i)),
            None => n.as_f64().and_then(clamp_score_f64),
        },
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(clamp_score_f64),
        _ => None,
    }
}

/// Order-preserving; non-string entries are dropped. Non-arrays yield `None`.
fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
