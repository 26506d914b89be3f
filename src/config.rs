//! Configuration module
//!
//! Every knob has a default in `constants.rs`; environment variables override.

use std::env;
use std::time::Duration;

use crate::constants;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Declared feature columns, in matrix order
    pub features: Vec<String>,

    /// Anomaly percentile (0-100)
    pub percentile: f64,

    /// Forced positives per batch (demo mode, 0 = off)
    pub demo_forced: usize,

    /// Anomaly scorer: `isolation_forest` or `lof`
    pub scorer: String,

    /// Isolation trees
    pub trees: usize,

    /// Sub-sample size per tree
    pub sample_size: usize,

    /// Score jitter amplitude (0 = off)
    pub jitter: f64,

    /// Seed for every random draw; `None` seeds from entropy
    pub seed: Option<u64>,

    /// Use the attribution explainer when possible
    pub attribution: bool,

    /// Zero-shot classifier endpoint
    pub classifier_url: String,

    /// Hugging Face token; classifier is disabled without it
    pub classifier_token: Option<String>,

    pub classifier_timeout_secs: u64,

    pub virustotal_key: Option<String>,
    pub abuseipdb_key: Option<String>,
    pub virustotal_url: String,
    pub abuseipdb_url: String,

    /// Per-call reputation timeout
    pub intel_timeout_secs: u64,

    /// Distinct addresses enriched per batch
    pub intel_max_addresses: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            features: constants::DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect(),
            percentile: constants::DEFAULT_PERCENTILE,
            demo_forced: 0,
            scorer: constants::DEFAULT_SCORER.to_string(),
            trees: constants::DEFAULT_TREES,
            sample_size: constants::DEFAULT_SAMPLE_SIZE,
            jitter: 0.0,
            seed: None,
            attribution: true,
            classifier_url: constants::DEFAULT_CLASSIFIER_URL.to_string(),
            classifier_token: None,
            classifier_timeout_secs: constants::DEFAULT_CLASSIFIER_TIMEOUT_SECS,
            virustotal_key: None,
            abuseipdb_key: None,
            virustotal_url: constants::DEFAULT_VIRUSTOTAL_URL.to_string(),
            abuseipdb_url: constants::DEFAULT_ABUSEIPDB_URL.to_string(),
            intel_timeout_secs: constants::DEFAULT_INTEL_TIMEOUT_SECS,
            intel_max_addresses: constants::DEFAULT_INTEL_MAX_ADDRESSES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            features: env::var("IDS_FEATURES")
                .ok()
                .map(|s| parse_list(&s))
                .filter(|cols| !cols.is_empty())
                .unwrap_or(defaults.features),

            percentile: parse_var("IDS_PERCENTILE").unwrap_or(defaults.percentile),

            demo_forced: parse_var("IDS_DEMO_FORCED").unwrap_or(defaults.demo_forced),

            scorer: env::var("IDS_SCORER")
                .map(|s| s.trim().to_lowercase())
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.scorer),

            trees: parse_var("IDS_TREES").unwrap_or(defaults.trees),

            sample_size: parse_var("IDS_SAMPLE_SIZE").unwrap_or(defaults.sample_size),

            jitter: parse_var("IDS_JITTER").unwrap_or(defaults.jitter),

            seed: parse_var("IDS_SEED"),

            attribution: env::var("IDS_ATTRIBUTION")
                .map(|s| s.to_lowercase() != "false" && s != "0")
                .unwrap_or(defaults.attribution),

            classifier_url: env::var("IDS_CLASSIFIER_URL").unwrap_or(defaults.classifier_url),

            classifier_token: non_empty_var("HF_API_TOKEN"),

            classifier_timeout_secs: parse_var("IDS_CLASSIFIER_TIMEOUT_SECS")
                .unwrap_or(defaults.classifier_timeout_secs),

            virustotal_key: non_empty_var("VIRUSTOTAL_API_KEY"),

            abuseipdb_key: non_empty_var("ABUSEIPDB_API_KEY"),

            virustotal_url: env::var("VIRUSTOTAL_URL").unwrap_or(defaults.virustotal_url),

            abuseipdb_url: env::var("ABUSEIPDB_URL").unwrap_or(defaults.abuseipdb_url),

            intel_timeout_secs: parse_var("IDS_INTEL_TIMEOUT_SECS")
                .unwrap_or(defaults.intel_timeout_secs),

            intel_max_addresses: parse_var("IDS_INTEL_MAX_ADDRESSES")
                .unwrap_or(defaults.intel_max_addresses),
        }
    }

    pub fn intel_timeout(&self) -> Duration {
        Duration::from_secs(self.intel_timeout_secs)
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
