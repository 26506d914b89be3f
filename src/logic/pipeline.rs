//! Pipeline Orchestrator
//!
//! Luồng xử lý một batch:
//! extract -> standardise -> score -> threshold -> explain, categorize, enrich
//!
//! `run` never fails. Each stage yields an `Outcome`; degraded stages are
//! logged and listed in `PipelineResult::degraded`, and the result always has
//! one score, one label and one category per input record.
//!
//! Scoring and explanation are CPU-bound and run on the blocking pool.

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::logic::explain::{AttributionExplainer, ExplainMethod, ExplainabilityEngine, Explanation};
use crate::logic::external_intel::{ReputationRecord, ThreatIntelEnricher};
use crate::logic::features::{FeatureExtractor, TrafficRecord};
use crate::logic::features::FeatureMatrix;
use crate::logic::model::{
    AnomalyScorer, IsolationForest, LocalOutlierFactor, ThresholdStats, Thresholded, Thresholder,
};
use crate::logic::outcome::{Outcome, StageDiagnostic};
use crate::logic::threat::{
    CategoryAssignment, DisabledClassifier, HuggingFaceClassifier, ThreatCategorizer, ZeroShotClassifier,
};

// ============================================================================
// RESULT
// ============================================================================

/// Everything produced for one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub scores: Vec<f64>,
    pub labels: Vec<u8>,
    pub threshold: f64,
    /// Indices labelled anomalous by demo injection
    pub forced_indices: Vec<usize>,
    pub features: Vec<String>,
    pub feature_importances: Vec<f64>,
    pub method: ExplainMethod,
    pub categories: Vec<CategoryAssignment>,
    pub intel: Vec<ReputationRecord>,
    pub degraded: Vec<StageDiagnostic>,
}

impl PipelineResult {
    /// Canonical result for an empty batch
    pub fn empty() -> Self {
        Self {
            scores: Vec::new(),
            labels: Vec::new(),
            threshold: 0.0,
            forced_indices: Vec::new(),
            features: Vec::new(),
            feature_importances: Vec::new(),
            method: ExplainMethod::None,
            categories: Vec::new(),
            intel: Vec::new(),
            degraded: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn anomaly_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    pub fn is_degraded(&self, stage: &str) -> bool {
        self.degraded.iter().any(|d| d.stage == stage)
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    extractor: FeatureExtractor,
    scorer: Arc<dyn AnomalyScorer>,
    thresholder: Thresholder,
    explainer: Arc<ExplainabilityEngine>,
    categorizer: ThreatCategorizer,
    enricher: ThreatIntelEnricher,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Wire every stage from configuration; missing credentials select the
    /// disabled classifier and synthetic intel
    pub fn from_config(config: &Config) -> Self {
        Self::builder().config(config.clone()).build()
    }

    pub fn feature_columns(&self) -> &[String] {
        self.extractor.columns()
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    pub async fn run(&self, records: &[TrafficRecord]) -> PipelineResult {
        if records.is_empty() {
            log::debug!("Empty batch, nothing to do");
            return PipelineResult::empty();
        }

        let n = records.len();
        let mut degraded = Vec::new();

        // Extract + standardise
        let matrix = Outcome::from_result(
            self.extractor.extract(records).map(|m| Some(m.standardized())),
            None,
        );
        let matrix = collect(&mut degraded, "extract", matrix).map(Arc::new);

        // Score
        let scores = match &matrix {
            Some(matrix) => collect(&mut degraded, "score", self.score(matrix.clone(), n).await),
            None => vec![0.0; n],
        };
        log::debug!("Scored {} records with {}", n, self.scorer.name());

        // Threshold
        let thresholded = self.thresholder.threshold(&scores);
        log::debug!(
            "Threshold: {:?}",
            ThresholdStats::from_output(&thresholded, self.thresholder.config().percentile)
        );
        let Thresholded { labels, threshold, forced } = thresholded;

        // Explain
        let explanation = match matrix {
            Some(matrix) => collect(&mut degraded, "explain", self.explain(matrix, scores.clone()).await),
            None => Explanation::none(),
        };
        log::debug!(
            "Explained with method '{}', top features: {:?}",
            explanation.method,
            explanation.top_contributions(self.extractor.columns(), 3)
        );

        // Categorize
        let categories = collect(&mut degraded, "categorize", self.categorizer.categorize_batch(records).await);

        // Enrich
        let intel = collect(&mut degraded, "enrich", self.enricher.enrich_anomalies(records, &labels).await);

        let anomalies = labels.iter().filter(|&&l| l == 1).count();
        let attacks = categories.iter().filter(|c| c.label.is_attack()).count();
        log::info!(
            "Batch processed: {} records, {} anomalies (threshold {:.4}, {} forced), {} attack categories, {} enriched, {} degraded stages",
            n,
            anomalies,
            threshold,
            forced.len(),
            attacks,
            intel.len(),
            degraded.len()
        );

        PipelineResult {
            scores,
            labels,
            threshold,
            forced_indices: forced,
            features: self.extractor.columns().to_vec(),
            feature_importances: explanation.feature_importances,
            method: explanation.method,
            categories,
            intel,
            degraded,
        }
    }
}

impl Pipeline {
    /// Exactly `n` scores, or zeros with the reason
    async fn score(&self, matrix: Arc<FeatureMatrix>, n: usize) -> Outcome<Vec<f64>> {
        let scorer = self.scorer.clone();
        let scored = match tokio::task::spawn_blocking(move || scorer.fit_score(&matrix)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("scoring task failed: {}", e)),
        };

        match scored {
            Ok(scores) if scores.len() == n => Outcome::Complete(scores),
            Ok(scores) => Outcome::degraded(
                vec![0.0; n],
                format!("scorer returned {} scores for {} rows", scores.len(), n),
            ),
            Err(reason) => Outcome::degraded(vec![0.0; n], reason),
        }
    }

    async fn explain(&self, matrix: Arc<FeatureMatrix>, scores: Vec<f64>) -> Outcome<Explanation> {
        let explainer = self.explainer.clone();
        match tokio::task::spawn_blocking(move || explainer.explain(&matrix, &scores)).await {
            Ok(explanation) => explanation,
            Err(e) => Outcome::degraded(Explanation::error(), format!("explain task failed: {}", e)),
        }
    }
}

/// Take the stage value, recording the reason if it degraded
fn collect<T>(degraded: &mut Vec<StageDiagnostic>, stage: &str, outcome: Outcome<T>) -> T {
    if let Some(reason) = outcome.reason() {
        log::warn!("Stage '{}' degraded: {}", stage, reason);
        degraded.push(StageDiagnostic::new(stage, reason));
    }
    outcome.into_value()
}

// ============================================================================
// BUILDER
// ============================================================================

/// Stages not set explicitly are built from `config`
#[derive(Default)]
pub struct PipelineBuilder {
    config: Config,
    scorer: Option<Arc<dyn AnomalyScorer>>,
    explainer: Option<ExplainabilityEngine>,
    classifier: Option<Arc<dyn ZeroShotClassifier>>,
    enricher: Option<ThreatIntelEnricher>,
}

impl PipelineBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn scorer(mut self, scorer: Arc<dyn AnomalyScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn explainer(mut self, explainer: ExplainabilityEngine) -> Self {
        self.explainer = Some(explainer);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn ZeroShotClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn enricher(mut self, enricher: ThreatIntelEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn build(self) -> Pipeline {
        let config = self.config;

        let scorer = self.scorer.unwrap_or_else(|| scorer_from_config(&config));

        let mut thresholder = Thresholder::new(config.percentile);
        if config.demo_forced > 0 {
            let seed = config.seed.unwrap_or_else(rand::random);
            thresholder = thresholder.with_forced_positives(config.demo_forced, seed);
        }

        let explainer = self.explainer.unwrap_or_else(|| {
            let attribution = config.attribution.then(|| AttributionExplainer::new(config.seed));
            ExplainabilityEngine::new(attribution)
        });

        let classifier = self.classifier.unwrap_or_else(|| classifier_from_config(&config));
        let enricher = self.enricher.unwrap_or_else(|| ThreatIntelEnricher::from_config(&config));

        log::info!(
            "Pipeline ready: {} features, p{} threshold, scorer={}, explain={}, classifier={}, intel={}",
            config.features.len(),
            thresholder.config().percentile,
            scorer.name(),
            explainer.preferred_method(),
            classifier.name(),
            if enricher.is_synthetic() { "synthetic" } else { "live" }
        );

        Pipeline {
            extractor: FeatureExtractor::new(config.features.clone(), config.seed),
            scorer,
            thresholder,
            explainer: Arc::new(explainer),
            categorizer: ThreatCategorizer::new(classifier),
            enricher,
        }
    }
}

fn scorer_from_config(config: &Config) -> Arc<dyn AnomalyScorer> {
    match config.scorer.as_str() {
        "lof" | "local_outlier_factor" => Arc::new(LocalOutlierFactor::default()),
        other => {
            if other != "isolation_forest" {
                log::warn!("Unknown scorer '{}', using isolation_forest", other);
            }
            Arc::new(IsolationForest::new(config.trees, config.sample_size, config.seed).with_jitter(config.jitter))
        }
    }
}

fn classifier_from_config(config: &Config) -> Arc<dyn ZeroShotClassifier> {
    let Some(token) = &config.classifier_token else {
        log::info!("HF_API_TOKEN not set - categories fall back to Normal");
        return Arc::new(DisabledClassifier);
    };

    match HuggingFaceClassifier::new(&config.classifier_url, token, config.classifier_timeout()) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            log::warn!("Zero-shot classifier unavailable: {}", e);
            Arc::new(DisabledClassifier)
        }
    }
}
