//! Threat Module
//!
//! Gán threat category cho từng record.
//!
//! ## Structure
//! - `types`: ThreatCategory taxonomy, CategoryAssignment
//! - `classifier`: zero-shot capability (Hugging Face / disabled)
//! - `categorizer`: taxonomy mapping + fallback
//!
//! ## Usage
//! ```ignore
//! let categorizer = ThreatCategorizer::disabled();
//! let assignment = categorizer.categorize(&record).await.into_value();
//! assert_eq!(assignment.label, ThreatCategory::Normal);
//! ```

pub mod types;
pub mod classifier;
pub mod categorizer;

pub use types::{CategoryAssignment, LabelScore, ThreatCategory};
pub use classifier::{DisabledClassifier, HuggingFaceClassifier, ZeroShotClassifier};
pub use categorizer::ThreatCategorizer;
