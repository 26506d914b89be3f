//! Pipeline Scenario Tests
//!
//! Chạy toàn bộ pipeline trên các batch nhỏ với capabilities giả lập.

#[cfg(test)]
mod scenario_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::config::Config;
    use crate::error::{ClassifierError, IntelError, ScoreError};
    use crate::logic::explain::{ExplainMethod, ExplainabilityEngine};
    use crate::logic::external_intel::{ReputationSource, ThreatIntelEnricher};
    use crate::logic::features::{FeatureMatrix, TrafficRecord};
    use crate::logic::model::AnomalyScorer;
    use crate::logic::pipeline::{Pipeline, PipelineResult};
    use crate::logic::threat::{CategoryAssignment, LabelScore, ThreatCategory, ZeroShotClassifier};

    // ------------------------------------------------------------------------
    // Fakes
    // ------------------------------------------------------------------------

    /// Returns preset scores regardless of the matrix
    struct FixedScorer(Vec<f64>);

    impl AnomalyScorer for FixedScorer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fit_score(&self, _matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoreError> {
            Ok(self.0.clone())
        }
    }

    /// Records the thread `fit_score` ran on
    #[derive(Default)]
    struct ThreadScorer(std::sync::Mutex<Option<std::thread::ThreadId>>);

    impl AnomalyScorer for ThreadScorer {
        fn name(&self) -> &str {
            "thread"
        }

        fn fit_score(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoreError> {
            *self.0.lock().unwrap() = Some(std::thread::current().id());
            Ok(vec![0.5; matrix.rows()])
        }
    }

    struct BrokenScorer;

    impl AnomalyScorer for BrokenScorer {
        fn name(&self) -> &str {
            "broken"
        }

        fn fit_score(&self, _matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoreError> {
            Err(ScoreError::InvalidParameter("broken on purpose".to_string()))
        }
    }

    struct PortScanClassifier;

    #[async_trait]
    impl ZeroShotClassifier for PortScanClassifier {
        fn name(&self) -> &str {
            "portscan"
        }

        async fn classify(&self, _text: &str, _labels: &[String]) -> Result<Vec<LabelScore>, ClassifierError> {
            Ok(vec![
                LabelScore { label: "Port Scanning".to_string(), score: 0.93 },
                LabelScore { label: "Normal Traffic".to_string(), score: 0.07 },
            ])
        }
    }

    struct CountingSource {
        score: f64,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(score: f64) -> Arc<Self> {
            Arc::new(Self { score, calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReputationSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn lookup(&self, _address: &str) -> Result<f64, IntelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.score)
        }
    }

    struct UnreachableSource;

    #[async_trait]
    impl ReputationSource for UnreachableSource {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn lookup(&self, _address: &str) -> Result<f64, IntelError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(10.0)
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn seeded_config() -> Config {
        Config {
            seed: Some(42),
            trees: 50,
            ..Default::default()
        }
    }

    /// `n` ordinary records plus one large outlier at the end
    fn batch_with_outlier(n: usize) -> Vec<TrafficRecord> {
        let mut records: Vec<TrafficRecord> = (0..n)
            .map(|i| {
                let ip = format!("10.0.0.{}", i % 5);
                TrafficRecord::new(Some(&ip), 40000 + (i % 7) as u16, 443, 500 + (i % 11) as u32 * 10, "tcp")
            })
            .collect();
        records.push(TrafficRecord::new(Some("203.0.113.66"), 1, 31337, 65000, "udp"));
        records
    }

    fn records_with_ips(ips: &[&str]) -> Vec<TrafficRecord> {
        ips.iter()
            .enumerate()
            .map(|(i, ip)| TrafficRecord::new(Some(ip), 50000 + i as u16, 80, 300 + i as u32, "tcp"))
            .collect()
    }

    fn assert_lengths(result: &PipelineResult, n: usize) {
        assert_eq!(result.scores.len(), n);
        assert_eq!(result.labels.len(), n);
        assert_eq!(result.categories.len(), n);
    }

    // ------------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_lengths_and_label_rule() {
        let records = batch_with_outlier(40);
        let result = Pipeline::from_config(&seeded_config()).run(&records).await;

        assert_lengths(&result, records.len());
        assert!(result.scores.iter().all(|s| (0.0..=1.0).contains(s)));

        for (i, (&score, &label)) in result.scores.iter().zip(result.labels.iter()).enumerate() {
            let expected = score > result.threshold || result.forced_indices.contains(&i);
            assert_eq!(label == 1, expected, "record {}", i);
        }
        assert!(result.forced_indices.is_empty());
        assert_eq!(result.labels[records.len() - 1], 1, "outlier must be flagged");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let source = CountingSource::new(5.0);
        let pipeline = Pipeline::builder()
            .config(seeded_config())
            .enricher(ThreatIntelEnricher::live(source.clone(), CountingSource::new(5.0)))
            .build();

        let result = pipeline.run(&[]).await;

        assert_eq!(result, PipelineResult::empty());
        assert_eq!(result.method, ExplainMethod::None);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_constant_column_gets_zero_importance() {
        // 100 records x (length, src_port, dst_port); dst_port never changes
        let records: Vec<TrafficRecord> = (0..100)
            .map(|i| TrafficRecord::new(Some("10.1.1.1"), 1024 + (i * 37 % 100) as u16, 80, 64 + (i * i % 1400) as u32, "tcp"))
            .collect();

        for explainer in [ExplainabilityEngine::default(), ExplainabilityEngine::correlation_only()] {
            let pipeline = Pipeline::builder().config(seeded_config()).explainer(explainer).build();
            let result = pipeline.run(&records).await;

            assert_eq!(result.features, vec!["length", "src_port", "dst_port"]);
            let w = &result.feature_importances;
            assert_eq!(w.len(), 3);
            assert_eq!(w[2], 0.0);
            assert!(w.iter().all(|v| *v >= 0.0));
            assert!((w[0] + w[1] - 1.0).abs() < 1e-6, "method {}: {:?}", result.method, w);
        }
    }

    #[tokio::test]
    async fn test_default_explainer_uses_attribution() {
        let result = Pipeline::from_config(&seeded_config()).run(&batch_with_outlier(30)).await;
        assert_eq!(result.method, ExplainMethod::Attribution);
        assert!(!result.is_degraded("explain"));
    }

    #[tokio::test]
    async fn test_disabled_classifier_falls_back_to_normal() {
        let records = batch_with_outlier(10);
        let result = Pipeline::from_config(&seeded_config()).run(&records).await;

        assert!(result.categories.iter().all(|c| *c == CategoryAssignment::fallback()));
        assert!(result.is_degraded("categorize"));
    }

    #[tokio::test]
    async fn test_injected_classifier() {
        let pipeline = Pipeline::builder()
            .config(seeded_config())
            .classifier(Arc::new(PortScanClassifier))
            .build();
        let result = pipeline.run(&batch_with_outlier(5)).await;

        assert!(result.categories.iter().all(|c| c.label == ThreatCategory::PortScanning && c.score == 0.93));
        assert!(!result.is_degraded("categorize"));
    }

    #[tokio::test]
    async fn test_only_anomalous_addresses_are_enriched() {
        let records = records_with_ips(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.2", "10.0.0.4"]);
        let (a, b) = (CountingSource::new(4.0), CountingSource::new(50.0));

        let pipeline = Pipeline::builder()
            .config(Config { percentile: 50.0, ..seeded_config() })
            .scorer(Arc::new(FixedScorer(vec![0.1, 0.9, 0.2, 0.8, 0.3])))
            .enricher(ThreatIntelEnricher::live(a.clone(), b.clone()))
            .build();
        let result = pipeline.run(&records).await;

        // p50 = 0.3 -> records 1 and 3 (both 10.0.0.2)
        assert_eq!(result.labels, vec![0, 1, 0, 1, 0]);
        assert_eq!(result.intel.len(), 1);
        assert_eq!(result.intel[0].address, "10.0.0.2");
        assert_eq!(result.intel[0].combined_score, 0.6 * 4.0 + 0.4 * 50.0);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_enrichment_cap() {
        let ips: Vec<String> = (0..25).map(|i| format!("192.0.2.{}", i)).collect();
        let ip_refs: Vec<&str> = ips.iter().map(|s| s.as_str()).collect();
        let records = records_with_ips(&ip_refs);
        let source = CountingSource::new(1.0);

        let pipeline = Pipeline::builder()
            .config(Config { percentile: 0.0, ..seeded_config() })
            .scorer(Arc::new(FixedScorer((0..25).map(|i| 0.5 + i as f64 / 100.0).collect())))
            .enricher(ThreatIntelEnricher::live(source.clone(), CountingSource::new(1.0)))
            .build();
        let result = pipeline.run(&records).await;

        assert_eq!(result.anomaly_count(), 24);
        assert_eq!(result.intel.len(), 10);
        assert_eq!(source.calls(), 10);
    }

    #[tokio::test]
    async fn test_unreachable_source_scores_zero() {
        let records = records_with_ips(&["10.0.0.1", "10.0.0.2"]);
        let enricher = ThreatIntelEnricher::live(Arc::new(UnreachableSource), CountingSource::new(70.0))
            .with_timeout(Duration::from_millis(50));

        let pipeline = Pipeline::builder()
            .config(seeded_config())
            .scorer(Arc::new(FixedScorer(vec![0.2, 0.9])))
            .enricher(enricher)
            .build();
        let result = pipeline.run(&records).await;

        assert_eq!(result.intel.len(), 1);
        let record = &result.intel[0];
        assert_eq!(record.source_a_score, 0.0);
        assert_eq!(record.source_b_score, 70.0);
        assert_eq!(record.combined_score, 0.4 * 70.0);
        assert!(result.is_degraded("enrich"));
    }

    #[tokio::test]
    async fn test_synthetic_intel_without_keys() {
        let records = batch_with_outlier(20);
        let result = Pipeline::from_config(&seeded_config()).run(&records).await;

        assert!(!result.intel.is_empty());
        for record in &result.intel {
            assert!((0.0..=10.0).contains(&record.source_a_score));
            assert!((0.0..=100.0).contains(&record.source_b_score));
            assert_eq!(record.combined_score, 0.6 * record.source_a_score + 0.4 * record.source_b_score);
        }
    }

    #[tokio::test]
    async fn test_repeated_runs_give_same_labels() {
        let scores = vec![0.4, 0.1, 0.95, 0.3, 0.7, 0.2, 0.6, 0.5, 0.8, 0.05];
        let records = records_with_ips(&["10.0.0.1"; 10]);
        let pipeline = Pipeline::builder()
            .config(seeded_config())
            .scorer(Arc::new(FixedScorer(scores)))
            .build();

        let first = pipeline.run(&records).await;
        let second = pipeline.run(&records).await;
        assert_eq!(first.labels, second.labels);
        assert_eq!(first.threshold, second.threshold);
    }

    #[tokio::test]
    async fn test_seeded_pipelines_are_reproducible() {
        let records = batch_with_outlier(25);
        let first = Pipeline::from_config(&seeded_config()).run(&records).await;
        let second = Pipeline::from_config(&seeded_config()).run(&records).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_demo_forced_positives() {
        let records = batch_with_outlier(30);
        let config = Config { demo_forced: 3, ..seeded_config() };
        let result = Pipeline::from_config(&config).run(&records).await;

        assert_eq!(result.forced_indices.len(), 3);
        for &i in &result.forced_indices {
            assert_eq!(result.labels[i], 1);
            assert!(result.scores[i] <= result.threshold);
        }
    }

    #[tokio::test]
    async fn test_extraction_failure_degrades() {
        let records = batch_with_outlier(8);
        let config = Config { features: Vec::new(), ..seeded_config() };
        let result = Pipeline::from_config(&config).run(&records).await;

        assert_lengths(&result, records.len());
        assert!(result.scores.iter().all(|s| *s == 0.0));
        assert!(result.labels.iter().all(|l| *l == 0));
        assert_eq!(result.method, ExplainMethod::None);
        assert!(result.is_degraded("extract"));
        assert!(result.intel.is_empty());
    }

    #[tokio::test]
    async fn test_scoring_failure_degrades() {
        let records = batch_with_outlier(8);
        let pipeline = Pipeline::builder()
            .config(seeded_config())
            .scorer(Arc::new(BrokenScorer))
            .build();
        let result = pipeline.run(&records).await;

        assert_lengths(&result, records.len());
        assert!(result.scores.iter().all(|s| *s == 0.0));
        assert_eq!(result.anomaly_count(), 0);
        assert!(result.is_degraded("score"));
    }

    #[tokio::test]
    async fn test_short_scorer_output_degrades() {
        let records = batch_with_outlier(8);
        let pipeline = Pipeline::builder()
            .config(seeded_config())
            .scorer(Arc::new(FixedScorer(vec![0.9, 0.1])))
            .build();
        let result = pipeline.run(&records).await;

        assert_lengths(&result, records.len());
        assert!(result.scores.iter().all(|s| *s == 0.0));
        assert_eq!(result.anomaly_count(), 0);
        let diagnostic = result.degraded.iter().find(|d| d.stage == "score").unwrap();
        assert_eq!(diagnostic.reason, "scorer returned 2 scores for 9 rows");
    }

    #[tokio::test]
    async fn test_scoring_runs_off_the_async_thread() {
        let scorer = Arc::new(ThreadScorer::default());
        let pipeline = Pipeline::builder()
            .config(seeded_config())
            .scorer(scorer.clone())
            .build();
        let result = pipeline.run(&batch_with_outlier(5)).await;

        assert!(!result.is_degraded("score"));
        let scored_on = scorer.0.lock().unwrap().unwrap();
        assert_ne!(scored_on, std::thread::current().id());
    }

    #[tokio::test]
    async fn test_same_batch_twice_on_one_pipeline() {
        let records = batch_with_outlier(40);
        let config = Config { jitter: 0.05, demo_forced: 2, ..seeded_config() };
        let pipeline = Pipeline::from_config(&config);

        let first = pipeline.run(&records).await;
        let second = pipeline.run(&records).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_non_ip_source_never_looked_up() {
        let records = records_with_ips(&["not an ip", "10.0.0.9", "../admin", "10.0.0.1"]);
        let (a, b) = (CountingSource::new(2.0), CountingSource::new(20.0));

        let pipeline = Pipeline::builder()
            .config(Config { percentile: 0.0, ..seeded_config() })
            .scorer(Arc::new(FixedScorer(vec![0.9, 0.8, 0.95, 0.05])))
            .enricher(ThreatIntelEnricher::live(a.clone(), b.clone()))
            .build();
        let result = pipeline.run(&records).await;

        assert_eq!(result.labels, vec![1, 1, 1, 0]);
        assert_eq!(result.intel.len(), 1);
        assert_eq!(result.intel[0].address, "10.0.0.9");
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_lof_scorer_selected_by_config() {
        let records = batch_with_outlier(30);
        let config = Config { scorer: "lof".to_string(), ..seeded_config() };
        let pipeline = Pipeline::from_config(&config);
        assert_eq!(pipeline.scorer_name(), "local_outlier_factor");

        let result = pipeline.run(&records).await;
        assert_lengths(&result, records.len());
        assert!(!result.is_degraded("score"));
        let top = result
            .scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(top, Some(30));
        assert_eq!(result.labels[30], 1);
    }

    #[tokio::test]
    async fn test_result_json_fields() {
        let result = Pipeline::from_config(&seeded_config()).run(&batch_with_outlier(6)).await;
        let json = serde_json::to_value(&result).unwrap();

        for field in [
            "scores", "labels", "threshold", "forced_indices", "features",
            "feature_importances", "method", "categories", "intel", "degraded",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(json["categories"][0]["label"], "Normal");
        assert_eq!(json["degraded"][0]["stage"], "categorize");
    }
}
