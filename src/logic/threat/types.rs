//! Threat Types
//!
//! Core types cho threat categorization.
//! KHÔNG chứa logic - chỉ data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// THREAT CATEGORY (closed taxonomy)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatCategory {
    #[serde(rename = "DDoS")]
    Ddos,
    #[serde(rename = "Port Scanning")]
    PortScanning,
    #[serde(rename = "SQL Injection")]
    SqlInjection,
    #[serde(rename = "Phishing")]
    Phishing,
    #[serde(rename = "Brute Force")]
    BruteForce,
    #[serde(rename = "Data Exfiltration")]
    DataExfiltration,
    #[serde(rename = "Normal")]
    Normal,
}

impl ThreatCategory {
    pub const ALL: [ThreatCategory; 7] = [
        ThreatCategory::Ddos,
        ThreatCategory::PortScanning,
        ThreatCategory::SqlInjection,
        ThreatCategory::Phishing,
        ThreatCategory::BruteForce,
        ThreatCategory::DataExfiltration,
        ThreatCategory::Normal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Ddos => "DDoS",
            ThreatCategory::PortScanning => "Port Scanning",
            ThreatCategory::SqlInjection => "SQL Injection",
            ThreatCategory::Phishing => "Phishing",
            ThreatCategory::BruteForce => "Brute Force",
            ThreatCategory::DataExfiltration => "Data Exfiltration",
            ThreatCategory::Normal => "Normal",
        }
    }

    /// Phrase sent to the zero-shot model as a candidate label
    pub fn candidate_label(&self) -> &'static str {
        match self {
            ThreatCategory::Ddos => "DDoS Attack",
            ThreatCategory::PortScanning => "Port Scanning",
            ThreatCategory::SqlInjection => "SQL Injection",
            ThreatCategory::Phishing => "Phishing Attempt",
            ThreatCategory::BruteForce => "Brute Force Login",
            ThreatCategory::DataExfiltration => "Data Exfiltration",
            ThreatCategory::Normal => "Normal Traffic",
        }
    }

    pub fn candidate_labels() -> Vec<String> {
        Self::ALL.iter().map(|c| c.candidate_label().to_string()).collect()
    }

    /// Accepts either the candidate phrase or the short name
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.iter().copied().find(|c| {
            c.candidate_label().eq_ignore_ascii_case(label) || c.as_str().eq_ignore_ascii_case(label)
        })
    }

    pub fn is_attack(&self) -> bool {
        *self != ThreatCategory::Normal
    }
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CLASSIFIER OUTPUT
// ============================================================================

/// One ranked label from the zero-shot classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

// ============================================================================
// CATEGORY ASSIGNMENT
// ============================================================================

/// Per-record category + confidence (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    pub label: ThreatCategory,
    pub score: f64,
}

impl CategoryAssignment {
    /// Deterministic fallback when classification is unavailable
    pub fn fallback() -> Self {
        Self {
            label: ThreatCategory::Normal,
            score: 0.0,
        }
    }
}

impl Default for CategoryAssignment {
    fn default() -> Self {
        Self::fallback()
    }
}
