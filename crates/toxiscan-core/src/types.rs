//! Core types for Toxiscan

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Maximum comment length in characters, measured after trimming
pub const MAX_COMMENT_CHARS: usize = 512;

/// Trim a comment and check it against the submission rules.
///
/// Returns the trimmed comment. Length is counted in Unicode scalar values,
/// not bytes.
pub fn validate_comment(comment: &str) -> Result<&str> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyComment);
    }

    let length = trimmed.chars().count();
    if length > MAX_COMMENT_CHARS {
        return Err(Error::TooLong {
            length,
            max: MAX_COMMENT_CHARS,
        });
    }

    Ok(trimmed)
}

/// Binary toxicity verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToxicityLabel {
    #[serde(rename = "TOXIC")]
    Toxic,
    #[serde(rename = "NON-TOXIC", alias = "NON_TOXIC")]
    NonToxic,
}

impl ToxicityLabel {
    /// Map an upstream toxicity signal onto a label
    pub fn from_signal(is_toxic: bool) -> Self {
        if is_toxic {
            Self::Toxic
        } else {
            Self::NonToxic
        }
    }

    pub fn is_toxic(&self) -> bool {
        matches!(self, Self::Toxic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toxic => "TOXIC",
            Self::NonToxic => "NON-TOXIC",
        }
    }
}

impl fmt::Display for ToxicityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical classification content, before the history store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Trimmed comment text that was classified
    pub comment: String,

    /// Classification result
    pub result: ToxicityLabel,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,

    /// Round trip measured by the orchestrator (milliseconds)
    pub processing_time_ms: u64,

    /// When the orchestrator created this classification
    pub created_at: DateTime<Utc>,
}

/// A classification as stored in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Unique record ID, assigned on insertion
    pub id: String,

    /// The classification content
    #[serde(flatten)]
    pub classification: Classification,
}

impl ClassificationRecord {
    /// Wrap a classification with an identifier
    pub fn new(id: impl Into<String>, classification: Classification) -> Self {
        Self {
            id: id.into(),
            classification,
        }
    }

    pub fn comment(&self) -> &str {
        &self.classification.comment
    }

    pub fn result(&self) -> ToxicityLabel {
        self.classification.result
    }

    pub fn confidence(&self) -> f64 {
        self.classification.confidence
    }
}

/// Raw payload returned by the prediction service.
///
/// The service has answered in two shapes over time; anything else is kept
/// verbatim as `Unrecognized` so the normalizer can reject it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPrediction {
    /// `{"is_toxic": bool, "confidence"?: number}`
    Flag {
        is_toxic: bool,
        confidence: Option<f64>,
    },

    /// `{"prediction": 0|1, "confidence"?: number}`
    Binary {
        prediction: bool,
        confidence: Option<f64>,
    },

    /// No recognizable toxicity field
    Unrecognized(Value),
}

impl RawPrediction {
    /// Interpret a JSON payload.
    ///
    /// `is_toxic` wins over `prediction` when both keys are present, whatever
    /// their values. A present key always yields a verdict; only a payload
    /// with neither key is `Unrecognized`. Confidence values that are not
    /// finite numbers are treated as absent.
    pub fn from_value(value: Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Unrecognized(value);
        };

        let confidence = object
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite());

        if let Some(signal) = object.get("is_toxic") {
            return Self::Flag {
                is_toxic: truthy(signal),
                confidence,
            };
        }

        if let Some(signal) = object.get("prediction") {
            return Self::Binary {
                prediction: truthy(signal),
                confidence,
            };
        }

        Self::Unrecognized(value)
    }

    /// Confidence reported by the service, if any
    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::Flag { confidence, .. } | Self::Binary { confidence, .. } => *confidence,
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<Value> for RawPrediction {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Read a toxicity signal. Booleans as-is, nonzero numbers, and strings
/// spelling either of those are toxic; everything else is not.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<f64>() {
                Ok(v) => v != 0.0 && !v.is_nan(),
                Err(_) => ["true", "yes", "toxic"]
                    .iter()
                    .any(|word| s.eq_ignore_ascii_case(word)),
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}
