//! Logic Module - Detection & Enrichment Engines
//!
//! Chứa các engines xử lý một batch traffic records.
//!
//! ## Architecture
//! - `features/` - Record ingestion + feature matrix
//! - `model/` - Isolation forest scoring + adaptive threshold
//! - `explain/` - Feature importance (attribution / correlation)
//! - `threat/` - Zero-shot threat categories
//! - `external_intel/` - IP reputation enrichment
//! - `pipeline` - Orchestrator tying the stages together

pub mod outcome;
pub mod seed;

pub mod features;
pub mod model;
pub mod explain;
pub mod threat;
pub mod external_intel;

pub mod pipeline;

#[cfg(test)]
mod tests;

pub use outcome::{Outcome, StageDiagnostic};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineResult};
