//! Toxiscan Core
//!
//! Core types and error handling shared across Toxiscan components.
//!
//! This crate provides:
//! - The canonical classification record and toxicity label
//! - The raw prediction payload union returned by the prediction service
//! - Comment validation rules
//! - Error types and the failure taxonomy

pub mod error;
pub mod types;

pub use error::{Error, ErrorKind, Result, GENERIC_FAILURE_MESSAGE};
pub use types::{
    validate_comment, Classification, ClassificationRecord, RawPrediction, ToxicityLabel,
    MAX_COMMENT_CHARS,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::types::{Classification, ClassificationRecord, RawPrediction, ToxicityLabel};
}
