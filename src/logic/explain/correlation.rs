//! Correlation fallback
//!
//! |Pearson(column, scores)| per feature, normalised to sum to 1.
//! Deterministic, no sampling.

use crate::constants::{NORM_EPSILON, VARIANCE_EPSILON};
use crate::error::ExplainError;
use crate::logic::features::matrix::population_std;
use crate::logic::features::FeatureMatrix;

pub fn importances(matrix: &FeatureMatrix, scores: &[f64]) -> Result<Vec<f64>, ExplainError> {
    if matrix.rows() != scores.len() {
        return Err(ExplainError::ShapeMismatch {
            rows: matrix.rows(),
            scores: scores.len(),
        });
    }

    let raw: Vec<f64> = (0..matrix.cols())
        .map(|j| pearson(&matrix.column(j).to_vec(), scores).abs())
        .collect();

    normalize(raw)
}

/// Pearson r; 0 when either side is (near) constant
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }

    let sx = population_std(x[..n].iter().copied());
    let sy = population_std(y[..n].iter().copied());
    if sx < VARIANCE_EPSILON || sy < VARIANCE_EPSILON {
        return 0.0;
    }

    let mx = x[..n].iter().sum::<f64>() / n as f64;
    let my = y[..n].iter().sum::<f64>() / n as f64;
    let cov = x[..n]
        .iter()
        .zip(y[..n].iter())
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / n as f64;

    (cov / (sx * sy)).clamp(-1.0, 1.0)
}

/// w / (sum + eps); rejects NaN/inf
pub fn normalize(raw: Vec<f64>) -> Result<Vec<f64>, ExplainError> {
    if let Some(j) = raw.iter().position(|v| !v.is_finite()) {
        return Err(ExplainError::NonFinite(j));
    }
    let total = raw.iter().sum::<f64>() + NORM_EPSILON;
    Ok(raw.into_iter().map(|v| v / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&x, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[5.0; 4]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn test_negative_correlation_counts() {
        let m = FeatureMatrix::from_rows(&["up", "down"], &[vec![1.0, 4.0], vec![2.0, 3.0], vec![3.0, 2.0], vec![4.0, 1.0]]);
        let w = importances(&m, &[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert!((w[0] - 0.5).abs() < 1e-6);
        assert!((w[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_shape_mismatch() {
        let m = FeatureMatrix::from_rows(&["a"], &[vec![1.0], vec![2.0]]);
        assert_eq!(
            importances(&m, &[0.5]),
            Err(ExplainError::ShapeMismatch { rows: 2, scores: 1 })
        );
    }

    #[test]
    fn test_normalize_rejects_nan() {
        assert_eq!(normalize(vec![0.1, f64::NAN]), Err(ExplainError::NonFinite(1)));
    }
}
