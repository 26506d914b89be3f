//! External Intelligence Module - Threat Intel Enrichment
//!
//! Mục đích: Lấy reputation cho các địa chỉ bị đánh dấu anomalous
//!
//! # Components
//! - `virustotal.rs`: Source A, malicious engine count
//! - `abuseipdb.rs`: Source B, abuse confidence score
//! - `synthetic.rs`: Seeded stand-in when API keys are missing
//! - `enricher.rs`: Per-call timeouts, address cap, combined score

pub mod abuseipdb;
pub mod enricher;
pub mod synthetic;
pub mod types;
pub mod virustotal;

use std::net::IpAddr;

use async_trait::async_trait;

use crate::error::IntelError;

/// One reputation provider. Returns a non-negative sub-score for an address.
#[async_trait]
pub trait ReputationSource: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, address: &str) -> Result<f64, IntelError>;
}

/// Addresses go into request URLs, so anything that is not an IP is rejected
pub fn parse_address(address: &str) -> Result<IpAddr, IntelError> {
    address
        .parse()
        .map_err(|_| IntelError::InvalidAddress(address.to_string()))
}

pub use abuseipdb::AbuseIpDbClient;
pub use enricher::ThreatIntelEnricher;
pub use synthetic::SyntheticReputation;
pub use types::ReputationRecord;
pub use virustotal::VirusTotalClient;
