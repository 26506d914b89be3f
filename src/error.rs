//! Error handling
//!
//! One error enum per stage. Stage errors never leave the pipeline;
//! only `BatchError` (ingestion) reaches the caller.

use std::time::Duration;

use thiserror::Error;

/// Batch construction (ingestion) errors - the only user-visible failure
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Cannot read batch file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed batch: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record #{index}: {message}")]
    InvalidRecord { index: usize, message: String },
}

/// Feature extraction errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Empty batch")]
    EmptyBatch,

    #[error("No feature columns declared")]
    NoColumns,
}

/// Anomaly scoring errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("Empty feature matrix")]
    EmptyMatrix,

    #[error("Invalid scorer parameter: {0}")]
    InvalidParameter(String),
}

/// Explainability errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExplainError {
    #[error("Shape mismatch: {rows} rows vs {scores} scores")]
    ShapeMismatch { rows: usize, scores: usize },

    #[error("Non-finite importance for feature #{0}")]
    NonFinite(usize),
}

/// Zero-shot classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier not available: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Classifier returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClassifierError {
    /// The endpoint cannot be reached at all; later calls would fail the same way
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClassifierError::Unavailable(_) | ClassifierError::Network(_))
    }
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClassifierError::InvalidResponse(err.to_string())
        } else {
            ClassifierError::Network(err.to_string())
        }
    }
}

/// Reputation lookup errors
#[derive(Debug, Error)]
pub enum IntelError {
    #[error("{source_name} timed out after {timeout:?}")]
    Timeout { source_name: String, timeout: Duration },

    #[error("Not an IP address: {0}")]
    InvalidAddress(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Reputation source returned HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for IntelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            IntelError::Parse(err.to_string())
        } else {
            IntelError::Network(err.to_string())
        }
    }
}
