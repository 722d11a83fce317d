//! Error types for Toxiscan

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type alias using Toxiscan's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown to end users for any classification failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to classify comment. Please try again.";

/// Core error type for Toxiscan operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Comment was blank after trimming
    #[error("comment is empty")]
    EmptyComment,

    /// Comment exceeds the maximum length
    #[error("comment is {length} characters, maximum is {max}")]
    TooLong { length: usize, max: usize },

    /// Request body could not be read as a classification request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A classification is already in flight
    #[error("a classification is already in progress")]
    Busy,

    /// Prediction service could not be reached or did not answer in time
    #[error("prediction service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Prediction service answered with an error or an unreadable body
    #[error("prediction service error: {0}")]
    UpstreamError(String),

    /// Prediction payload carried no toxicity signal
    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// History persistence errors
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new invalid-request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new upstream-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Create a new upstream error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamError(msg.into())
    }

    /// Create a new malformed-response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Classify this error into the failure taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyComment => ErrorKind::EmptyComment,
            Self::TooLong { .. } => ErrorKind::TooLong,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Busy => ErrorKind::Busy,
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::UpstreamError(_) => ErrorKind::UpstreamError,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Config(_) | Self::Storage(_) | Self::Io(_) | Self::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Message suitable for display at the UI boundary.
    ///
    /// Every failure kind collapses to the same text; callers that need to
    /// tell failures apart use [`Error::kind`].
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }
}

/// Failure taxonomy exposed to callers and over the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    EmptyComment,
    TooLong,
    InvalidRequest,
    Busy,
    UpstreamUnavailable,
    UpstreamError,
    MalformedResponse,
    Internal,
}

impl ErrorKind {
    /// Stable wire name, also used as a metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyComment => "EMPTY_COMMENT",
            Self::TooLong => "TOO_LONG",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Busy => "BUSY",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::Internal => "INTERNAL",
        }
    }

    /// Whether this failure is detected locally, before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyComment | Self::TooLong | Self::InvalidRequest | Self::Busy
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
