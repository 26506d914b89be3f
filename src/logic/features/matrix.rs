//! Feature Matrix - Core data structure for ML input
//!
//! One row per record, one column per declared feature.
//! Column names travel with the data so explain output maps back to names.

use ndarray::{Array2, ArrayView1, Axis};

use crate::constants::VARIANCE_EPSILON;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    /// Column names in matrix order
    pub names: Vec<String>,
    /// rows x columns
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Self {
        debug_assert_eq!(names.len(), values.ncols());
        Self { names, values }
    }

    /// Build from row vectors (test/helper constructor)
    pub fn from_rows(names: &[&str], rows: &[Vec<f64>]) -> Self {
        let cols = names.len();
        let mut values = Array2::<f64>::zeros((rows.len(), cols));
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().take(cols).enumerate() {
                values[[i, j]] = *v;
            }
        }
        Self::new(names.iter().map(|s| s.to_string()).collect(), values)
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.column(index)
    }

    /// Population standard deviation of a column
    pub fn column_std(&self, index: usize) -> f64 {
        population_std(self.values.column(index).iter().copied())
    }

    /// Per-column z-score. Constant columns become all-zero.
    pub fn standardized(&self) -> Self {
        let mut values = self.values.clone();

        for (j, mut col) in values.axis_iter_mut(Axis(1)).enumerate() {
            let n = col.len().max(1) as f64;
            let mean = col.sum() / n;
            let std = self.column_std(j);

            if std < VARIANCE_EPSILON {
                col.fill(0.0);
            } else {
                col.mapv_inplace(|v| (v - mean) / std);
            }
        }

        Self::new(self.names.clone(), values)
    }
}

/// Population std (ddof = 0)
pub fn population_std<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

// ============================================================================
// TESTS
// ============================================================================
