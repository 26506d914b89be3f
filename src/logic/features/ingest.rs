//! Batch Ingestion
//!
//! JSON array -> Vec<TrafficRecord>. Missing values are imputed here so
//! everything downstream can assume numeric fields exist.

use std::fs;
use std::path::Path;

use crate::error::BatchError;
use super::record::{RawTrafficRecord, TrafficRecord};

/// Parse a JSON array of raw records
pub fn parse_records(json: &str) -> Result<Vec<TrafficRecord>, BatchError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<RawTrafficRecord>(value)
                .map(RawTrafficRecord::impute)
                .map_err(|e| BatchError::InvalidRecord {
                    index,
                    message: e.to_string(),
                })
        })
        .collect()
}

/// Load a batch from a JSON file
pub fn load_records(path: &Path) -> Result<Vec<TrafficRecord>, BatchError> {
    let body = fs::read_to_string(path)?;
    let records = parse_records(&body)?;
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
