//! Threat Categorizer
//!
//! Record -> closest label in the closed taxonomy.
//! Mỗi record được xử lý độc lập: a failure on one record only affects
//! that record, which gets the `{Normal, 0.0}` fallback.

use std::sync::Arc;

use super::classifier::{DisabledClassifier, ZeroShotClassifier};
use super::types::{CategoryAssignment, ThreatCategory};
use crate::error::ClassifierError;
use crate::logic::features::TrafficRecord;
use crate::logic::outcome::Outcome;

pub struct ThreatCategorizer {
    classifier: Arc<dyn ZeroShotClassifier>,
    candidate_labels: Vec<String>,
}

impl ThreatCategorizer {
    pub fn new(classifier: Arc<dyn ZeroShotClassifier>) -> Self {
        Self {
            classifier,
            candidate_labels: ThreatCategory::candidate_labels(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledClassifier))
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub async fn categorize(&self, record: &TrafficRecord) -> Outcome<CategoryAssignment> {
        self.assign(record)
            .await
            .unwrap_or_else(|e| Outcome::degraded(CategoryAssignment::fallback(), e.to_string()))
    }

    /// One assignment per record, same order. Reasons of degraded records
    /// are collapsed into the first one seen. Once the classifier is
    /// unreachable the remaining records get the fallback without a call.
    pub async fn categorize_batch(&self, records: &[TrafficRecord]) -> Outcome<Vec<CategoryAssignment>> {
        let mut assignments = Vec::with_capacity(records.len());
        let mut degraded = 0usize;
        let mut first_reason: Option<String> = None;

        for record in records {
            let outcome = match self.assign(record).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_unreachable() => {
                    log::warn!(
                        "Classifier {} unreachable ({}), skipping {} remaining records",
                        self.classifier.name(),
                        e,
                        records.len() - assignments.len() - 1
                    );
                    first_reason.get_or_insert_with(|| e.to_string());
                    degraded += records.len() - assignments.len();
                    assignments.resize(records.len(), CategoryAssignment::fallback());
                    break;
                }
                Err(e) => Outcome::degraded(CategoryAssignment::fallback(), e.to_string()),
            };
            if let Some(reason) = outcome.reason() {
                degraded += 1;
                if first_reason.is_none() {
                    first_reason = Some(reason.to_string());
                }
            }
            assignments.push(outcome.into_value());
        }

        match first_reason {
            Some(reason) => {
                log::debug!("{}/{} records fell back to Normal", degraded, records.len());
                Outcome::degraded(
                    assignments,
                    format!("{}/{} records uncategorized: {}", degraded, records.len(), reason),
                )
            }
            None => Outcome::Complete(assignments),
        }
    }

    /// `Err` only when the classifier call itself failed
    async fn assign(&self, record: &TrafficRecord) -> Result<Outcome<CategoryAssignment>, ClassifierError> {
        let text = record.describe();
        let ranked = self.classifier.classify(&text, &self.candidate_labels).await?;

        let Some(top) = ranked.first() else {
            return Ok(Outcome::degraded(CategoryAssignment::fallback(), "empty ranking"));
        };

        Ok(match ThreatCategory::from_label(&top.label) {
            Some(label) if top.score.is_finite() => Outcome::Complete(CategoryAssignment {
                label,
                score: top.score.clamp(0.0, 1.0),
            }),
            Some(_) => Outcome::degraded(CategoryAssignment::fallback(), "non-finite score"),
            None => Outcome::degraded(
                CategoryAssignment::fallback(),
                format!("label outside taxonomy: {}", top.label),
            ),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
