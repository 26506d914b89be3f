//! Features Module - Feature Extraction Engine
//!
//! Tách logic trích xuất features khỏi scoring.
//! - `record`: TrafficRecord + imputation
//! - `ingest`: JSON batch loading
//! - `matrix`: FeatureMatrix (ndarray) + standardisation
//! - `extractor`: records -> matrix

pub mod record;
pub mod ingest;
pub mod matrix;
pub mod extractor;


// Re-export common types
pub use record::{RawTrafficRecord, TrafficRecord, NUMERIC_FIELDS};
pub use matrix::FeatureMatrix;
pub use extractor::FeatureExtractor;
pub use ingest::{load_records, parse_records};
