//! External Intelligence Types

use serde::{Deserialize, Serialize};

use crate::constants::{SOURCE_A_WEIGHT, SOURCE_B_WEIGHT};

// ============================================================================
// REPUTATION RECORD
// ============================================================================

/// Kết quả lookup cho một địa chỉ (per batch, không cache)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub address: String,
    /// VirusTotal: số engine đánh giá malicious
    pub source_a_score: f64,
    /// AbuseIPDB: abuse confidence (0 - 100)
    pub source_b_score: f64,
    /// 0.6 * a + 0.4 * b
    pub combined_score: f64,
}

impl ReputationRecord {
    pub fn combine(address: &str, source_a_score: f64, source_b_score: f64) -> Self {
        Self {
            address: address.to_string(),
            source_a_score,
            source_b_score,
            combined_score: SOURCE_A_WEIGHT * source_a_score + SOURCE_B_WEIGHT * source_b_score,
        }
    }

    /// Both sources unknown
    pub fn unknown(address: &str) -> Self {
        Self::combine(address, 0.0, 0.0)
    }
}

// ============================================================================
// VIRUSTOTAL API TYPES
// ============================================================================

// Chỉ giữ các field thực sự được đọc; serde bỏ qua phần còn lại.

#[derive(Debug, Clone, Deserialize)]
pub struct VTApiResponse {
    pub data: VTApiData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VTApiData {
    pub attributes: VTApiAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VTApiAttributes {
    pub last_analysis_stats: Option<VTApiStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VTApiStats {
    #[serde(default)]
    pub malicious: u32,
}

// ============================================================================
// ABUSEIPDB API TYPES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AbuseApiResponse {
    pub data: AbuseApiData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbuseApiData {
    pub abuse_confidence_score: u32,
}
