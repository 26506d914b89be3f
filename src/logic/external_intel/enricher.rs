//! Threat Intel Enricher
//!
//! Lookup reputation cho các source address của anomalous records.
//! Mode được chọn một lần lúc khởi tạo:
//! - Live: both API keys present, real lookups with per-call timeout
//! - Synthetic: a key is missing, seeded random sub-scores
//!
//! Any lookup failure counts as 0 for that source. No retries.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use super::abuseipdb::AbuseIpDbClient;
use super::synthetic::SyntheticReputation;
use super::types::ReputationRecord;
use super::virustotal::VirusTotalClient;
use super::ReputationSource;
use crate::config::Config;
use crate::constants::{DEFAULT_INTEL_MAX_ADDRESSES, DEFAULT_INTEL_TIMEOUT_SECS};
use crate::error::IntelError;
use crate::logic::features::TrafficRecord;
use crate::logic::outcome::Outcome;

// ============================================================================
// MODE
// ============================================================================

enum IntelMode {
    Live {
        source_a: Arc<dyn ReputationSource>,
        source_b: Arc<dyn ReputationSource>,
    },
    Synthetic(SyntheticReputation),
}

pub struct ThreatIntelEnricher {
    mode: IntelMode,
    timeout: Duration,
    max_addresses: usize,
}

impl ThreatIntelEnricher {
    /// Live mode with injected sources (A = malicious count, B = confidence %)
    pub fn live(source_a: Arc<dyn ReputationSource>, source_b: Arc<dyn ReputationSource>) -> Self {
        Self {
            mode: IntelMode::Live { source_a, source_b },
            timeout: Duration::from_secs(DEFAULT_INTEL_TIMEOUT_SECS),
            max_addresses: DEFAULT_INTEL_MAX_ADDRESSES,
        }
    }

    pub fn synthetic(seed: Option<u64>) -> Self {
        Self {
            mode: IntelMode::Synthetic(SyntheticReputation::new(seed)),
            timeout: Duration::from_secs(DEFAULT_INTEL_TIMEOUT_SECS),
            max_addresses: DEFAULT_INTEL_MAX_ADDRESSES,
        }
    }

    /// VirusTotal + AbuseIPDB when both keys exist, synthetic otherwise
    pub fn from_config(config: &Config) -> Self {
        let enricher = match (&config.virustotal_key, &config.abuseipdb_key) {
            (Some(vt_key), Some(abuse_key)) => {
                let vt = VirusTotalClient::new(&config.virustotal_url, vt_key, config.intel_timeout());
                let abuse = AbuseIpDbClient::new(&config.abuseipdb_url, abuse_key, config.intel_timeout());

                match (vt, abuse) {
                    (Ok(vt), Ok(abuse)) => Self::live(Arc::new(vt), Arc::new(abuse)),
                    (Err(e), _) | (_, Err(e)) => {
                        log::warn!("Reputation clients unavailable ({}), using synthetic intel", e);
                        Self::synthetic(config.seed)
                    }
                }
            }
            _ => {
                log::info!("Reputation API keys not configured - synthetic intel mode");
                Self::synthetic(config.seed)
            }
        };

        enricher
            .with_timeout(config.intel_timeout())
            .with_max_addresses(config.intel_max_addresses)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_addresses(mut self, max_addresses: usize) -> Self {
        self.max_addresses = max_addresses;
        self
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.mode, IntelMode::Synthetic(_))
    }

    pub fn max_addresses(&self) -> usize {
        self.max_addresses
    }

    /// Always a well-formed record; failed sources count as 0
    pub async fn enrich(&self, address: &str) -> Outcome<ReputationRecord> {
        match &self.mode {
            IntelMode::Synthetic(synthetic) => {
                let (a, b) = synthetic.draws(1).first().copied().unwrap_or((0.0, 0.0));
                Outcome::Complete(ReputationRecord::combine(address, a, b))
            }
            IntelMode::Live { source_a, source_b } => {
                lookup_pair(source_a.clone(), source_b.clone(), address.to_string(), self.timeout).await
            }
        }
    }

    /// Distinct source addresses of anomalous records, first-seen order, capped.
    /// Values that do not parse as an IP address are skipped.
    pub fn anomalous_addresses(&self, records: &[TrafficRecord], labels: &[u8]) -> Vec<String> {
        let mut seen = HashSet::new();
        records
            .iter()
            .zip(labels.iter())
            .filter(|(_, &label)| label == 1)
            .filter_map(|(record, _)| record.src_ip.as_deref())
            .filter(|ip| {
                let valid = ip.parse::<IpAddr>().is_ok();
                if !valid {
                    log::warn!("Skipping reputation lookup for non-IP source {:?}", ip);
                }
                valid
            })
            .filter(|ip| seen.insert(*ip))
            .take(self.max_addresses)
            .map(|ip| ip.to_string())
            .collect()
    }

    /// Enrich every anomalous address (concurrently in live mode)
    pub async fn enrich_anomalies(&self, records: &[TrafficRecord], labels: &[u8]) -> Outcome<Vec<ReputationRecord>> {
        let addresses = self.anomalous_addresses(records, labels);
        if addresses.is_empty() {
            return Outcome::Complete(Vec::new());
        }

        let (source_a, source_b) = match &self.mode {
            IntelMode::Synthetic(synthetic) => {
                let intel = addresses
                    .iter()
                    .zip(synthetic.draws(addresses.len()))
                    .map(|(address, (a, b))| ReputationRecord::combine(address, a, b))
                    .collect();
                return Outcome::Complete(intel);
            }
            IntelMode::Live { source_a, source_b } => (source_a, source_b),
        };

        // One task per address; the address cap bounds the concurrency
        let mut tasks = JoinSet::new();
        for (index, address) in addresses.iter().enumerate() {
            let (a, b) = (source_a.clone(), source_b.clone());
            let (address, timeout) = (address.clone(), self.timeout);
            tasks.spawn(async move { (index, lookup_pair(a, b, address, timeout).await) });
        }

        let mut slots: Vec<Option<Outcome<ReputationRecord>>> = vec![None; addresses.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => log::warn!("Reputation task failed: {}", e),
            }
        }

        let mut failures = Vec::new();
        let intel = slots
            .into_iter()
            .zip(addresses.iter())
            .map(|(slot, address)| {
                let outcome = slot.unwrap_or_else(|| Outcome::degraded(ReputationRecord::unknown(address), "task aborted"));
                if let Some(reason) = outcome.reason() {
                    failures.push(format!("{}: {}", address, reason));
                }
                outcome.into_value()
            })
            .collect();

        if failures.is_empty() {
            Outcome::Complete(intel)
        } else {
            Outcome::degraded(intel, failures.join("; "))
        }
    }
}

// ============================================================================
// LOOKUP
// ============================================================================

async fn lookup_pair(
    source_a: Arc<dyn ReputationSource>,
    source_b: Arc<dyn ReputationSource>,
    address: String,
    timeout: Duration,
) -> Outcome<ReputationRecord> {
    let (a, b) = tokio::join!(
        lookup_with_timeout(source_a.as_ref(), &address, timeout),
        lookup_with_timeout(source_b.as_ref(), &address, timeout),
    );

    let mut reasons = Vec::new();
    let a = a.unwrap_or_else(|e| {
        reasons.push(e.to_string());
        0.0
    });
    let b = b.unwrap_or_else(|e| {
        reasons.push(e.to_string());
        0.0
    });

    let record = ReputationRecord::combine(&address, a, b);
    if reasons.is_empty() {
        Outcome::Complete(record)
    } else {
        log::warn!("Reputation lookup for {} incomplete: {}", address, reasons.join(", "));
        Outcome::degraded(record, reasons.join(", "))
    }
}

async fn lookup_with_timeout(
    source: &dyn ReputationSource,
    address: &str,
    timeout: Duration,
) -> Result<f64, IntelError> {
    match tokio::time::timeout(timeout, source.lookup(address)).await {
        Ok(Ok(score)) if score.is_finite() && score >= 0.0 => Ok(score),
        Ok(Ok(score)) => Err(IntelError::Parse(format!("{} returned {}", source.name(), score))),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(IntelError::Timeout {
            source_name: source.name().to_string(),
            timeout,
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================
