//! Explainability Engine
//!
//! Attribution nếu có, correlation nếu không. Never fails: empty input gives
//! `none`, an internal failure gives `error`.

use super::attribution::AttributionExplainer;
use super::correlation;
use super::types::{ExplainMethod, Explanation};
use crate::logic::features::FeatureMatrix;
use crate::logic::outcome::Outcome;

pub struct ExplainabilityEngine {
    attribution: Option<AttributionExplainer>,
}

impl ExplainabilityEngine {
    /// `None` = correlation only
    pub fn new(attribution: Option<AttributionExplainer>) -> Self {
        Self { attribution }
    }

    pub fn correlation_only() -> Self {
        Self::new(None)
    }

    pub fn preferred_method(&self) -> ExplainMethod {
        if self.attribution.is_some() {
            ExplainMethod::Attribution
        } else {
            ExplainMethod::Correlation
        }
    }

    pub fn explain(&self, matrix: &FeatureMatrix, scores: &[f64]) -> Outcome<Explanation> {
        if matrix.is_empty() || scores.is_empty() {
            return Outcome::degraded(Explanation::none(), "empty input");
        }

        let mut fallback_reason = None;

        if let Some(attribution) = &self.attribution {
            match attribution.importances(matrix, scores) {
                Ok(feature_importances) => {
                    return Outcome::Complete(Explanation {
                        method: ExplainMethod::Attribution,
                        feature_importances,
                    });
                }
                Err(e) => {
                    log::warn!("Attribution failed ({}), using correlation", e);
                    fallback_reason = Some(format!("attribution failed: {}", e));
                }
            }
        }

        match correlation::importances(matrix, scores) {
            Ok(feature_importances) => {
                let explanation = Explanation {
                    method: ExplainMethod::Correlation,
                    feature_importances,
                };
                match fallback_reason {
                    Some(reason) => Outcome::degraded(explanation, reason),
                    None => Outcome::Complete(explanation),
                }
            }
            Err(e) => Outcome::degraded(Explanation::error(), e.to_string()),
        }
    }
}

impl Default for ExplainabilityEngine {
    fn default() -> Self {
        Self::new(Some(AttributionExplainer::default()))
    }
}
