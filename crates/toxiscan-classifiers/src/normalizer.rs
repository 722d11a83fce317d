//! Prediction normalization
//!
//! Turns a [`RawPrediction`] into the verdict/confidence pair that every
//! stored classification is built from. Pure: no I/O, no clock, no ids.

use serde_json::Value;
use toxiscan_core::{Error, RawPrediction, Result, ToxicityLabel};

/// Confidence used when the service does not report one
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

/// Normalized prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Binary verdict
    pub result: ToxicityLabel,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

impl Prediction {
    pub fn is_toxic(&self) -> bool {
        self.result.is_toxic()
    }
}

/// Normalize a raw payload.
///
/// Fails with `MalformedResponse` when the payload carries no toxicity
/// signal at all.
pub fn normalize(raw: &RawPrediction) -> Result<Prediction> {
    let is_toxic = match raw {
        RawPrediction::Flag { is_toxic, .. } => *is_toxic,
        RawPrediction::Binary { prediction, .. } => *prediction,
        RawPrediction::Unrecognized(value) => {
            return Err(Error::malformed(format!(
                "expected 'is_toxic' or 'prediction', got {}",
                summarize(value)
            )));
        }
    };

    Ok(Prediction {
        result: ToxicityLabel::from_signal(is_toxic),
        confidence: normalize_confidence(raw.confidence()),
    })
}

/// Parse and normalize a JSON payload in one step
pub fn normalize_value(value: Value) -> Result<Prediction> {
    normalize(&RawPrediction::from_value(value))
}

/// Absent or non-finite → default; out of range → clamped.
pub fn normalize_confidence(confidence: Option<f64>) -> f64 {
    match confidence {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

fn summarize(value: &Value) -> String {
    const LIMIT: usize = 120;
    let text = value.to_string();
    if text.chars().count() <= LIMIT {
        text
    } else {
        let mut short: String = text.chars().take(LIMIT).collect();
        short.push_str("...");
        short
    }
}
