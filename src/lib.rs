//! ids-enrich - Traffic Anomaly Enrichment Pipeline
//!
//! Score a batch of network traffic records, label anomalies with an
//! adaptive threshold, explain the scores, assign threat categories and
//! enrich anomalous source addresses with reputation data.

pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use config::Config;
pub use logic::{Pipeline, PipelineResult};
