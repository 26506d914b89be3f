//! AbuseIPDB Integration Module
//!
//! Source B of the combined reputation score: abuse confidence (0 - 100)
//! over the last 90 days.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::AbuseApiResponse;
use super::{parse_address, ReputationSource};
use crate::error::IntelError;

const MAX_AGE_DAYS: &str = "90";

#[derive(Debug)]
pub struct AbuseIpDbClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl AbuseIpDbClient {
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
}

#[async_trait]
impl ReputationSource for AbuseIpDbClient {
    fn name(&self) -> &str {
        "abuseipdb"
    }

    async fn lookup(&self, address: &str) -> Result<f64, IntelError> {
        let ip = parse_address(address)?.to_string();
        let response = self.client
            .get(format!("{}/check", self.base_url))
            .query(&[("ipAddress", ip.as_str()), ("maxAgeInDays", MAX_AGE_DAYS)])
            .header("Key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IntelError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_confidence(&body)
    }
}

/// `data.abuseConfidenceScore`, clamped to 0 - 100
pub fn parse_confidence(body: &str) -> Result<f64, IntelError> {
    let resp: AbuseApiResponse = serde_json::from_str(body)
        .map_err(|e| IntelError::Parse(e.to_string()))?;

    Ok(resp.data.abuse_confidence_score.min(100) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confidence() {
        let body = r#"{"data": {"ipAddress": "118.25.6.39", "isPublic": true,
            "abuseConfidenceScore": 87, "totalReports": 12, "countryCode": "CN"}}"#;
        assert_eq!(parse_confidence(body).unwrap(), 87.0);
    }

    #[test]
    fn test_missing_score_is_parse_error() {
        let body = r#"{"data": {"ipAddress": "1.1.1.1"}}"#;
        assert!(matches!(parse_confidence(body), Err(IntelError::Parse(_))));
    }

    #[tokio::test]
    async fn test_hostname_rejected_before_request() {
        let client = AbuseIpDbClient::new("http://127.0.0.1:9", "k", Duration::from_millis(500)).unwrap();
        let err = client.lookup("evil.example").await.unwrap_err();
        assert!(matches!(err, IntelError::InvalidAddress(_)));
    }

    #[test]
    fn test_error_payload_is_parse_error() {
        let body = r#"{"errors": [{"detail": "Authentication failed", "status": 401}]}"#;
        assert!(parse_confidence(body).is_err());
    }
}
