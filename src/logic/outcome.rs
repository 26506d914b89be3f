//! Stage Outcome
//!
//! Mỗi stage trả về `Outcome<T>` thay vì `Result`: either the real value or
//! the documented fallback plus the reason it was used. The pipeline can
//! always take a value out, so no stage error can escape it.

use serde::{Deserialize, Serialize};

/// Result of one pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Stage ran normally
    Complete(T),
    /// Stage failed or a capability was missing; `value` is the fallback
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Outcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    /// Ok -> Complete, Err -> Degraded with `fallback`
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>, fallback: T) -> Self {
        match result {
            Ok(value) => Outcome::Complete(value),
            Err(e) => Outcome::degraded(fallback, e.to_string()),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Complete(value) => value,
            Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Complete(value) => value,
            Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Complete(value) => Outcome::Complete(f(value)),
            Outcome::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

/// A degraded stage, as reported in the pipeline output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostic {
    pub stage: String,
    pub reason: String,
}

impl StageDiagnostic {
    pub fn new(stage: &str, reason: &str) -> Self {
        Self {
            stage: stage.to_string(),
            reason: reason.to_string(),
        }
    }
}
