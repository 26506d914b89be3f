//! Central Configuration Constants
//!
//! Single source of truth for all pipeline defaults.
//! Runtime overrides are read by `config::Config::from_env`.

/// Default feature columns (same order as the offline scaler was fit on)
pub const DEFAULT_FEATURES: &[&str] = &["length", "src_port", "dst_port"];

/// Default anomaly percentile (top 10% of a batch is flagged)
pub const DEFAULT_PERCENTILE: f64 = 90.0;

/// Upper bound for forced-positive demo injection
pub const MAX_FORCED_POSITIVES: usize = 10;

// ============================================
// Isolation forest
// ============================================

/// Default number of isolation trees
pub const DEFAULT_TREES: usize = 100;

/// Default sub-sample size per tree
pub const DEFAULT_SAMPLE_SIZE: usize = 256;

/// Neighbours per point for the local outlier factor scorer
pub const DEFAULT_LOF_NEIGHBORS: usize = 20;

/// Scorer used when `IDS_SCORER` is unset
pub const DEFAULT_SCORER: &str = "isolation_forest";

/// Maximum score jitter amplitude (sensor-noise simulation)
pub const MAX_JITTER: f64 = 0.05;

/// Jitter is also capped at this fraction of the batch score std
pub const JITTER_SPREAD_FRACTION: f64 = 0.05;

/// Upper bound of the random fill for undeclared/missing columns
pub const IMPUTE_UPPER: f64 = 1.0;

// ============================================
// Explainability
// ============================================

/// Background / explained sample size for attribution
pub const ATTRIBUTION_SAMPLE: usize = 50;

/// Permutations per explained row
pub const ATTRIBUTION_PERMUTATIONS: usize = 8;

/// Normalisation epsilon (avoids division by zero)
pub const NORM_EPSILON: f64 = 1e-9;

/// Columns with std below this are treated as constant
pub const VARIANCE_EPSILON: f64 = 1e-9;

// ============================================
// Zero-shot classification
// ============================================

/// Default Hugging Face inference endpoint
pub const DEFAULT_CLASSIFIER_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

/// Default classifier request timeout (seconds)
pub const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 15;

// ============================================
// Threat intelligence
// ============================================

pub const DEFAULT_VIRUSTOTAL_URL: &str = "https://www.virustotal.com/api/v3";
pub const DEFAULT_ABUSEIPDB_URL: &str = "https://api.abuseipdb.com/api/v2";

/// Per-call timeout for reputation lookups (seconds)
pub const DEFAULT_INTEL_TIMEOUT_SECS: u64 = 10;

/// Distinct anomalous addresses enriched per batch
pub const DEFAULT_INTEL_MAX_ADDRESSES: usize = 10;

/// Weight of the VirusTotal malicious count in the combined score
pub const SOURCE_A_WEIGHT: f64 = 0.6;

/// Weight of the AbuseIPDB confidence in the combined score
pub const SOURCE_B_WEIGHT: f64 = 0.4;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "ids-enrich";
