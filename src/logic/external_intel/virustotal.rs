//! VirusTotal Integration Module
//!
//! Mục đích: Query VirusTotal API để lấy số engine đánh giá IP là malicious.
//! Source A of the combined reputation score.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::VTApiResponse;
use super::{parse_address, ReputationSource};
use crate::error::IntelError;

// ============================================================================
// VT CLIENT
// ============================================================================

#[derive(Debug)]
pub struct VirusTotalClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl VirusTotalClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, IntelError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntelError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn ip_url(&self, address: IpAddr) -> String {
        format!("{}/ip_addresses/{}", self.base_url, address)
    }
}

#[async_trait]
impl ReputationSource for VirusTotalClient {
    fn name(&self) -> &str {
        "virustotal"
    }

    async fn lookup(&self, address: &str) -> Result<f64, IntelError> {
        let ip = parse_address(address)?;
        let response = self.client
            .get(self.ip_url(ip))
            .header("x-apikey", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IntelError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_malicious(&body)
    }
}

// ============================================================================
// PARSE RESPONSE
// ============================================================================

/// `data.attributes.last_analysis_stats.malicious`; missing stats count as 0
pub fn parse_malicious(body: &str) -> Result<f64, IntelError> {
    let resp: VTApiResponse = serde_json::from_str(body)
        .map_err(|e| IntelError::Parse(e.to_string()))?;

    let stats = resp.data.attributes.last_analysis_stats.unwrap_or_default();
    Ok(stats.malicious as f64)
}

// ============================================================================
// TESTS
// ============================================================================
