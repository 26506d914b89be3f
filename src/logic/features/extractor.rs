//! Feature Extractor
//!
//! Records + declared column list -> FeatureMatrix.
//! Columns the records cannot supply are filled with a bounded random value
//! so a batch always produces a matrix.

use ndarray::Array2;
use rand::Rng;

use crate::constants::IMPUTE_UPPER;
use crate::error::ExtractError;
use crate::logic::seed::batch_rng;
use super::matrix::FeatureMatrix;
use super::record::TrafficRecord;

pub struct FeatureExtractor {
    columns: Vec<String>,
    /// Imputation restarts from this seed on every batch
    seed: Option<u64>,
}

impl FeatureExtractor {
    pub fn new(columns: Vec<String>, seed: Option<u64>) -> Self {
        Self { columns, seed }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Build the matrix. Fails only on an empty batch or empty column list.
    pub fn extract(&self, records: &[TrafficRecord]) -> Result<FeatureMatrix, ExtractError> {
        if records.is_empty() {
            return Err(ExtractError::EmptyBatch);
        }
        if self.columns.is_empty() {
            return Err(ExtractError::NoColumns);
        }

        let mut values = Array2::<f64>::zeros((records.len(), self.columns.len()));
        let mut rng = batch_rng(self.seed);

        for (j, column) in self.columns.iter().enumerate() {
            let mut imputed = 0usize;

            for (i, record) in records.iter().enumerate() {
                values[[i, j]] = match record.numeric_field(column) {
                    Some(v) if v.is_finite() => v,
                    _ => {
                        imputed += 1;
                        rng.gen_range(0.0..IMPUTE_UPPER)
                    }
                };
            }

            if imputed > 0 {
                log::warn!("Column '{}' imputed for {}/{} records", column, imputed, records.len());
            }
        }

        Ok(FeatureMatrix::new(self.columns.clone(), values))
    }
}
