//! Adaptive Threshold
//!
//! Quản lý ngưỡng phát hiện anomaly.
//! Threshold = percentile of the current batch's scores, so the anomaly rate
//! calibrates itself per batch. Scores from different batches are therefore
//! not comparable against one absolute cutoff.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PERCENTILE, MAX_FORCED_POSITIVES};

/// Forced-positive injection (demo / live dashboard only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForcedPositives {
    /// Indices forced per batch (capped at MAX_FORCED_POSITIVES)
    pub count: usize,
    pub seed: u64,
}

/// Threshold Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Percentile of batch scores (0 - 100)
    pub percentile: f64,

    /// Demo injection; `None` in normal deployments
    pub forced: Option<ForcedPositives>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_PERCENTILE,
            forced: None,
        }
    }
}

impl ThresholdConfig {
    pub fn new(percentile: f64) -> Self {
        Self {
            percentile,
            ..Default::default()
        }
    }
}

/// Thresholder output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholded {
    /// 0 = benign, 1 = anomalous
    pub labels: Vec<u8>,
    /// Score cutoff used for this batch
    pub threshold: f64,
    /// Indices labelled 1 by demo injection, not by statistics
    pub forced: Vec<usize>,
}

impl Thresholded {
    pub fn empty() -> Self {
        Self {
            labels: Vec::new(),
            threshold: 0.0,
            forced: Vec::new(),
        }
    }

    pub fn anomaly_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    pub fn is_anomalous(&self, index: usize) -> bool {
        self.labels.get(index) == Some(&1)
    }
}

// ============================================================================
// THRESHOLDER
// ============================================================================

#[derive(Debug, Clone)]
pub struct Thresholder {
    config: ThresholdConfig,
}

impl Thresholder {
    pub fn new(percentile: f64) -> Self {
        Self::from_config(ThresholdConfig::new(percentile))
    }

    pub fn from_config(mut config: ThresholdConfig) -> Self {
        config.percentile = if config.percentile.is_finite() {
            config.percentile.clamp(0.0, 100.0)
        } else {
            DEFAULT_PERCENTILE
        };
        if let Some(forced) = config.forced.as_mut() {
            forced.count = forced.count.min(MAX_FORCED_POSITIVES);
        }
        Self { config }
    }

    /// Enable demo injection of up to `count` extra anomalous indices
    pub fn with_forced_positives(self, count: usize, seed: u64) -> Self {
        let mut config = self.config;
        config.forced = (count > 0).then_some(ForcedPositives { count, seed });
        Self::from_config(config)
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Label a batch. Same scores + same config => same labels.
    pub fn threshold(&self, scores: &[f64]) -> Thresholded {
        if scores.is_empty() {
            return Thresholded::empty();
        }

        let threshold = percentile(scores, self.config.percentile);
        let mut labels: Vec<u8> = scores.iter().map(|&s| u8::from(s > threshold)).collect();

        let forced = match self.config.forced {
            Some(forced) => {
                let candidates: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == 0).collect();
                let amount = forced.count.min(candidates.len());
                let mut rng = StdRng::seed_from_u64(forced.seed);

                let mut picked: Vec<usize> = sample(&mut rng, candidates.len(), amount)
                    .into_iter()
                    .map(|k| candidates[k])
                    .collect();
                picked.sort_unstable();

                for &i in &picked {
                    labels[i] = 1;
                }
                picked
            }
            None => Vec::new(),
        };

        if !forced.is_empty() {
            log::debug!("Demo mode: forced {} extra anomalies", forced.len());
        }

        Thresholded {
            labels,
            threshold,
            forced,
        }
    }
}

impl Default for Thresholder {
    fn default() -> Self {
        Self::from_config(ThresholdConfig::default())
    }
}

/// Linear-interpolated percentile (numpy default method)
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Threshold statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdStats {
    pub threshold: f64,
    pub percentile: f64,
    pub anomalies: usize,
    pub forced: usize,
    pub sample_count: usize,
}

impl ThresholdStats {
    pub fn from_output(output: &Thresholded, percentile: f64) -> Self {
        Self {
            threshold: output.threshold,
            percentile,
            anomalies: output.anomaly_count(),
            forced: output.forced.len(),
            sample_count: output.labels.len(),
        }
    }
}
