//! Attribution Explainer - sampling-based Shapley attribution
//!
//! Không có model thật để giải thích, nên dùng surrogate:
//! `f(z) = sum_j tanh(z_j) * std(scores)`.
//! Shapley values are estimated by permutation sampling against a random
//! background sample; importance = mean |phi| per feature.

use rand::seq::index::sample;
use rand::seq::SliceRandom;

use crate::constants::{ATTRIBUTION_PERMUTATIONS, ATTRIBUTION_SAMPLE};
use crate::error::ExplainError;
use crate::logic::features::matrix::population_std;
use crate::logic::features::FeatureMatrix;
use crate::logic::seed::batch_rng;
use super::correlation::normalize;

pub struct AttributionExplainer {
    /// Background rows (drawn without replacement)
    background_size: usize,
    /// Leading rows explained
    explained_rows: usize,
    /// Feature orderings sampled per (row, background) pair
    permutations: usize,
    seed: Option<u64>,
}

impl Default for AttributionExplainer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AttributionExplainer {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            background_size: ATTRIBUTION_SAMPLE,
            explained_rows: ATTRIBUTION_SAMPLE,
            permutations: ATTRIBUTION_PERMUTATIONS,
            seed,
        }
    }

    pub fn with_permutations(mut self, permutations: usize) -> Self {
        self.permutations = permutations.max(1);
        self
    }

    pub fn importances(&self, matrix: &FeatureMatrix, scores: &[f64]) -> Result<Vec<f64>, ExplainError> {
        if matrix.rows() != scores.len() {
            return Err(ExplainError::ShapeMismatch {
                rows: matrix.rows(),
                scores: scores.len(),
            });
        }

        let n = matrix.rows();
        let d = matrix.cols();
        let scale = population_std(scores.iter().copied());
        let surrogate = |z: &[f64]| z.iter().map(|v| v.tanh() * scale).sum::<f64>();

        let mut rng = batch_rng(self.seed);

        let background: Vec<Vec<f64>> = sample(&mut rng, n, self.background_size.min(n))
            .into_iter()
            .map(|i| matrix.row(i).to_vec())
            .collect();

        let explained = self.explained_rows.min(n);
        let mut order: Vec<usize> = (0..d).collect();
        let mut mean_abs = vec![0.0f64; d];

        for i in 0..explained {
            let x = matrix.row(i).to_vec();
            let mut phi = vec![0.0f64; d];

            for _ in 0..self.permutations {
                order.shuffle(&mut rng);

                for b in &background {
                    let mut z = b.clone();
                    let mut prev = surrogate(&z);
                    for &j in &order {
                        z[j] = x[j];
                        let cur = surrogate(&z);
                        phi[j] += cur - prev;
                        prev = cur;
                    }
                }
            }

            let draws = (self.permutations * background.len()) as f64;
            for (acc, p) in mean_abs.iter_mut().zip(phi.iter()) {
                *acc += (p / draws).abs();
            }
        }

        if explained > 0 {
            for v in mean_abs.iter_mut() {
                *v /= explained as f64;
            }
        }

        normalize(mean_abs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_with_signal() -> (FeatureMatrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..60)
            .map(|i| {
                let t = i as f64 / 60.0;
                vec![t * 4.0 - 2.0, (i % 3) as f64 * 0.01, 0.0]
            })
            .collect();
        let scores: Vec<f64> = (0..60).map(|i| i as f64 / 60.0).collect();
        (FeatureMatrix::from_rows(&["strong", "weak", "flat"], &rows), scores)
    }

    #[test]
    fn test_importances_simplex() {
        let (m, scores) = matrix_with_signal();
        let w = AttributionExplainer::new(Some(11)).importances(&m, &scores).unwrap();

        assert_eq!(w.len(), 3);
        assert!(w.iter().all(|v| *v >= 0.0));
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(w[0] > w[1]);
        assert_eq!(w[2], 0.0);
    }

    #[test]
    fn test_constant_scores_give_zero() {
        let (m, _) = matrix_with_signal();
        let w = AttributionExplainer::new(Some(1)).importances(&m, &[0.5; 60]).unwrap();
        assert!(w.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let (m, scores) = matrix_with_signal();
        let a = AttributionExplainer::new(Some(5)).importances(&m, &scores).unwrap();
        let b = AttributionExplainer::new(Some(5)).importances(&m, &scores).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeat_call_same_result() {
        let (m, scores) = matrix_with_signal();
        let explainer = AttributionExplainer::new(Some(5));
        assert_eq!(explainer.importances(&m, &scores), explainer.importances(&m, &scores));
    }

    #[test]
    fn test_shape_mismatch() {
        let (m, _) = matrix_with_signal();
        assert!(AttributionExplainer::default().importances(&m, &[0.1]).is_err());
    }
}
