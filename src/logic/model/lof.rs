//! Local Outlier Factor
//!
//! Density-based alternative to the isolation forest. Deterministic: no RNG.
//!
//! LOF của một điểm = mật độ trung bình của k láng giềng / mật độ của nó.
//! Reported as `lof / (1 + lof)` so an inlier (lof ~ 1) lands near 0.5 and
//! outliers approach 1.

use ndarray::Array2;

use crate::constants::DEFAULT_LOF_NEIGHBORS;
use crate::error::ScoreError;
use crate::logic::features::FeatureMatrix;
use super::isolation_forest::AnomalyScorer;

/// Keeps the reachability density finite when neighbours coincide
const DENSITY_EPSILON: f64 = 1e-10;

pub struct LocalOutlierFactor {
    neighbors: usize,
}

impl Default for LocalOutlierFactor {
    fn default() -> Self {
        Self::new(DEFAULT_LOF_NEIGHBORS)
    }
}

impl LocalOutlierFactor {
    pub fn new(neighbors: usize) -> Self {
        Self { neighbors }
    }

    /// Raw LOF values, one per row
    pub fn factors(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoreError> {
        let n = matrix.rows();
        if n == 0 {
            return Err(ScoreError::EmptyMatrix);
        }
        if self.neighbors == 0 {
            return Err(ScoreError::InvalidParameter("neighbors=0".to_string()));
        }

        let k = self.neighbors.min(n - 1);
        if k == 0 {
            return Ok(vec![1.0; n]);
        }

        let distances = pairwise_distances(matrix);

        // k nearest neighbours of each row, closest first
        let neighbourhoods: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                let mut others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
                others.sort_by(|&a, &b| distances[[i, a]].total_cmp(&distances[[i, b]]));
                others.truncate(k);
                others
            })
            .collect();

        let k_distance: Vec<f64> = neighbourhoods
            .iter()
            .enumerate()
            .map(|(i, nb)| nb.last().map(|&j| distances[[i, j]]).unwrap_or(0.0))
            .collect();

        let density: Vec<f64> = neighbourhoods
            .iter()
            .enumerate()
            .map(|(i, nb)| {
                let reach = nb
                    .iter()
                    .map(|&j| k_distance[j].max(distances[[i, j]]))
                    .sum::<f64>()
                    / nb.len() as f64;
                1.0 / (reach + DENSITY_EPSILON)
            })
            .collect();

        Ok(neighbourhoods
            .iter()
            .enumerate()
            .map(|(i, nb)| {
                let mean = nb.iter().map(|&j| density[j]).sum::<f64>() / nb.len() as f64;
                mean / density[i]
            })
            .collect())
    }
}

impl AnomalyScorer for LocalOutlierFactor {
    fn name(&self) -> &str {
        "local_outlier_factor"
    }

    fn fit_score(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoreError> {
        let scores = self
            .factors(matrix)?
            .into_iter()
            .map(|lof| {
                let score = lof / (1.0 + lof);
                if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.5 }
            })
            .collect();

        log::debug!("Local outlier factor over {} rows (k={})", matrix.rows(), self.neighbors);
        Ok(scores)
    }
}

/// Euclidean distances, O(n^2) memory
fn pairwise_distances(matrix: &FeatureMatrix) -> Array2<f64> {
    let n = matrix.rows();
    let mut distances = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (&matrix.row(i) - &matrix.row(j)).mapv(|v| v * v).sum().sqrt();
            distances[[i, j]] = d;
            distances[[j, i]] = d;
        }
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_with_outlier() -> FeatureMatrix {
        let mut rows: Vec<Vec<f64>> = (0..99)
            .map(|i| vec![50.0 + (i % 10) as f64 * 0.1, 20.0 + (i % 7) as f64 * 0.1])
            .collect();
        rows.push(vec![500.0, -300.0]);
        FeatureMatrix::from_rows(&["a", "b"], &rows)
    }

    #[test]
    fn test_outlier_ranks_highest() {
        let scores = LocalOutlierFactor::default().fit_score(&clustered_with_outlier()).unwrap();

        assert_eq!(scores.len(), 100);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        let top = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(top, Some(99));
        assert!(scores[99] > 0.9);
    }

    #[test]
    fn test_uniform_grid_is_inlier() {
        let rows: Vec<Vec<f64>> = (0..36).map(|i| vec![(i % 6) as f64, (i / 6) as f64]).collect();
        let m = FeatureMatrix::from_rows(&["x", "y"], &rows);
        let factors = LocalOutlierFactor::new(4).factors(&m).unwrap();
        assert!(factors.iter().all(|f| *f > 0.5 && *f < 2.0));
    }

    #[test]
    fn test_constant_matrix_scores_half() {
        let m = FeatureMatrix::from_rows(&["a", "b"], &vec![vec![3.0, 3.0]; 30]);
        let scores = LocalOutlierFactor::default().fit_score(&m).unwrap();
        assert!(scores.iter().all(|s| (s - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_small_batch_shrinks_k() {
        let m = FeatureMatrix::from_rows(&["a"], &[vec![0.0], vec![1.0], vec![10.0]]);
        let scores = LocalOutlierFactor::default().fit_score(&m).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn test_isolated_point_in_small_batch() {
        let rows: Vec<Vec<f64>> = [0.0, 1.0, 2.0, 3.0, 50.0].iter().map(|v| vec![*v]).collect();
        let m = FeatureMatrix::from_rows(&["a"], &rows);
        let factors = LocalOutlierFactor::new(2).factors(&m).unwrap();
        assert!(factors[4] > 10.0);
        assert!(factors[..4].iter().all(|f| *f < 2.0));
    }

    #[test]
    fn test_single_row_and_empty() {
        let one = FeatureMatrix::from_rows(&["a"], &[vec![1.0]]);
        assert_eq!(LocalOutlierFactor::default().fit_score(&one).unwrap(), vec![0.5]);

        let empty = FeatureMatrix::from_rows(&["a"], &[]);
        assert_eq!(LocalOutlierFactor::default().fit_score(&empty), Err(ScoreError::EmptyMatrix));
        assert!(LocalOutlierFactor::new(0).fit_score(&one).is_err());
    }
}
