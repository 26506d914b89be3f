//! Model Module - Anomaly scoring & thresholding
//!
//! Tách logic scoring khỏi feature extraction.
//! Dễ dàng swap scorer qua trait `AnomalyScorer`.

pub mod isolation_forest;
pub mod lof;
pub mod threshold;

// Re-export common types
pub use isolation_forest::{AnomalyScorer, IsolationForest};
pub use lof::LocalOutlierFactor;
pub use threshold::{ThresholdConfig, Thresholded, Thresholder, ThresholdStats};
