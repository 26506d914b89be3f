//! Isolation Forest - unsupervised anomaly scorer
//!
//! Anomalies are easier to isolate and thus have shorter path lengths.
//! The forest is refit on every batch: no state survives between calls.
//! Jitter is capped by `MAX_JITTER` and by a fraction of the batch's own
//! score spread, so it cannot move many records across the threshold.

use rand::seq::index::sample;
use rand::Rng;

use crate::constants::{DEFAULT_SAMPLE_SIZE, DEFAULT_TREES, JITTER_SPREAD_FRACTION, MAX_JITTER};
use crate::error::ScoreError;
use crate::logic::features::matrix::population_std;
use crate::logic::features::FeatureMatrix;
use crate::logic::seed::batch_rng;

/// Euler-Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_9;

// ============================================================================
// SCORER TRAIT
// ============================================================================

/// Anything that turns a feature matrix into per-row anomaly scores
/// (higher = more anomalous)
pub trait AnomalyScorer: Send + Sync {
    fn name(&self) -> &str;
    fn fit_score(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoreError>;
}

// ============================================================================
// FOREST
// ============================================================================

pub struct IsolationForest {
    num_trees: usize,
    sample_size: usize,
    /// Jitter amplitude, 0 = off
    jitter: f64,
    /// Each `fit_score` starts a fresh RNG from this seed
    seed: Option<u64>,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new(DEFAULT_TREES, DEFAULT_SAMPLE_SIZE, None)
    }
}

impl IsolationForest {
    pub fn new(num_trees: usize, sample_size: usize, seed: Option<u64>) -> Self {
        Self {
            num_trees,
            sample_size,
            jitter: 0.0,
            seed,
        }
    }

    /// Zero-mean uniform noise, capped at MAX_JITTER. The amplitude used on a
    /// batch is further limited to `JITTER_SPREAD_FRACTION * std(scores)`.
    pub fn with_jitter(mut self, amplitude: f64) -> Self {
        self.jitter = amplitude.clamp(0.0, MAX_JITTER);
        self
    }

    /// c(n): average path length of an unsuccessful BST search
    pub fn average_path_length(n: usize) -> f64 {
        if n <= 1 {
            return 0.0;
        }
        if n == 2 {
            return 1.0;
        }
        let n = n as f64;
        2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
    }

    /// Jitter amplitude for this batch's clean scores
    pub fn effective_jitter(&self, scores: &[f64]) -> f64 {
        if self.jitter <= 0.0 {
            return 0.0;
        }
        self.jitter.min(JITTER_SPREAD_FRACTION * population_std(scores.iter().copied()))
    }

    fn fit<R: Rng>(&self, matrix: &FeatureMatrix, rng: &mut R) -> Vec<IsolationTree> {
        let n = matrix.rows();
        let psi = self.sample_size.min(n);
        let max_depth = (psi.max(2) as f64).log2().ceil() as usize;

        (0..self.num_trees)
            .map(|_| {
                let rows: Vec<usize> = sample(&mut *rng, n, psi).into_vec();
                IsolationTree::build(matrix, rows, max_depth, &mut *rng)
            })
            .collect()
    }
}

impl AnomalyScorer for IsolationForest {
    fn name(&self) -> &str {
        "isolation_forest"
    }

    fn fit_score(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoreError> {
        if matrix.rows() == 0 {
            return Err(ScoreError::EmptyMatrix);
        }
        if self.num_trees == 0 || self.sample_size == 0 {
            return Err(ScoreError::InvalidParameter(format!(
                "trees={}, sample_size={}",
                self.num_trees, self.sample_size
            )));
        }

        let mut rng = batch_rng(self.seed);
        let trees = self.fit(matrix, &mut rng);

        let psi = self.sample_size.min(matrix.rows());
        let c = Self::average_path_length(psi);

        let mut scores: Vec<f64> = (0..matrix.rows())
            .map(|i| {
                let point = matrix.row(i).to_vec();
                let avg_path = trees.iter().map(|t| t.path_length(&point)).sum::<f64>()
                    / trees.len() as f64;

                // Single-row batch: nothing to compare against
                let score = if c > 0.0 { 2f64.powf(-avg_path / c) } else { 0.5 };
                score.clamp(0.0, 1.0)
            })
            .collect();

        let amplitude = self.effective_jitter(&scores);
        if amplitude > 0.0 {
            for score in scores.iter_mut() {
                *score = (*score + rng.gen_range(-amplitude..=amplitude)).clamp(0.0, 1.0);
            }
        }

        log::debug!("Isolation forest: {} trees over {} rows (psi={})", trees.len(), matrix.rows(), psi);
        Ok(scores)
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone)]
enum IsolationNode {
    Internal {
        feature: usize,
        split: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: IsolationNode,
}

impl IsolationTree {
    fn build<R: Rng>(matrix: &FeatureMatrix, rows: Vec<usize>, max_depth: usize, rng: &mut R) -> Self {
        Self {
            root: Self::build_node(matrix, rows, 0, max_depth, rng),
        }
    }

    fn build_node<R: Rng>(
        matrix: &FeatureMatrix,
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> IsolationNode {
        if depth >= max_depth || rows.len() <= 1 {
            return IsolationNode::Leaf { size: rows.len() };
        }

        // Only split on features that still vary inside this node
        let candidates: Vec<(usize, f64, f64)> = (0..matrix.cols())
            .filter_map(|j| {
                let (min, max) = rows.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &i| {
                    let v = matrix.values[[i, j]];
                    (lo.min(v), hi.max(v))
                });
                (max > min).then_some((j, min, max))
            })
            .collect();

        if candidates.is_empty() {
            return IsolationNode::Leaf { size: rows.len() };
        }

        let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
        let split = rng.gen_range(min..max);

        let (left, right): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&i| matrix.values[[i, feature]] < split);

        IsolationNode::Internal {
            feature,
            split,
            left: Box::new(Self::build_node(matrix, left, depth + 1, max_depth, rng)),
            right: Box::new(Self::build_node(matrix, right, depth + 1, max_depth, rng)),
        }
    }

    fn path_length(&self, sample: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;

        loop {
            match node {
                IsolationNode::Leaf { size } => {
                    return depth as f64 + IsolationForest::average_path_length(*size);
                }
                IsolationNode::Internal { feature, split, left, right } => {
                    let v = sample.get(*feature).copied().unwrap_or(0.0);
                    node = if v < *split { &**left } else { &**right };
                    depth += 1;
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
