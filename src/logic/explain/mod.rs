//! Explain Module
//!
//! Feature importance cho anomaly scores.
//! - `attribution`: permutation-sampled Shapley values over a surrogate
//! - `correlation`: |Pearson| fallback
//! - `engine`: strategy selection + degradation

pub mod types;
pub mod attribution;
pub mod correlation;
pub mod engine;

pub use types::{ExplainMethod, Explanation, FeatureContribution};
pub use attribution::AttributionExplainer;
pub use engine::ExplainabilityEngine;
