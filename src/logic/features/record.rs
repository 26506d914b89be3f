//! Traffic Record - one observed network event
//!
//! `RawTrafficRecord` là dữ liệu thô (mọi field optional).
//! `TrafficRecord` là sau khi impute: numeric fields luôn có giá trị.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// NUMERIC FIELDS
// ============================================================================

/// Numeric columns a record can provide to the feature extractor
pub const NUMERIC_FIELDS: &[&str] = &[
    "length",       // payload length (bytes)
    "src_port",
    "dst_port",
    "protocol_num", // IANA protocol number
    "hour",         // hour of day from timestamp
];

/// Protocol name -> IANA number (0 = unknown)
pub fn protocol_number(protocol: &str) -> u8 {
    match protocol.trim().to_ascii_lowercase().as_str() {
        "icmp" => 1,
        "tcp" | "http" | "https" | "tls" | "ssh" => 6,
        "udp" | "dns" | "quic" => 17,
        "icmpv6" => 58,
        other => other.parse().unwrap_or(0),
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// Record as received (file, stream, API request)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTrafficRecord {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub src_ip: Option<String>,
    #[serde(default)]
    pub dst_ip: Option<String>,
    #[serde(default)]
    pub src_port: Option<u16>,
    #[serde(default)]
    pub dst_port: Option<u16>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub protocol: Option<String>,
}

impl RawTrafficRecord {
    /// Fill missing values (numeric -> 0, like the training set's fillna(0))
    pub fn impute(self) -> TrafficRecord {
        TrafficRecord {
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            src_ip: self.src_ip.filter(|s| !s.trim().is_empty()),
            dst_ip: self.dst_ip.filter(|s| !s.trim().is_empty()),
            src_port: self.src_port.unwrap_or(0),
            dst_port: self.dst_port.unwrap_or(0),
            length: self.length.unwrap_or(0),
            protocol: self
                .protocol
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Record after ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub timestamp: DateTime<Utc>,
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u32,
    pub protocol: String,
}

impl TrafficRecord {
    pub fn new(src_ip: Option<&str>, src_port: u16, dst_port: u16, length: u32, protocol: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            src_ip: src_ip.map(|s| s.to_string()),
            dst_ip: None,
            src_port,
            dst_port,
            length,
            protocol: protocol.to_string(),
        }
    }

    /// Numeric value of a declared column, `None` if the record has no such field
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        match name {
            "length" => Some(self.length as f64),
            "src_port" => Some(self.src_port as f64),
            "dst_port" => Some(self.dst_port as f64),
            "protocol_num" => Some(protocol_number(&self.protocol) as f64),
            "hour" => Some(self.timestamp.hour() as f64),
            _ => None,
        }
    }

    /// "key: value" pairs, space separated (input text for zero-shot)
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("timestamp: {}", self.timestamp.to_rfc3339())];
        if let Some(ip) = &self.src_ip {
            parts.push(format!("src_ip: {}", ip));
        }
        if let Some(ip) = &self.dst_ip {
            parts.push(format!("dst_ip: {}", ip));
        }
        parts.push(format!("src_port: {}", self.src_port));
        parts.push(format!("dst_port: {}", self.dst_port));
        parts.push(format!("length: {}", self.length));
        parts.push(format!("protocol: {}", self.protocol));
        parts.join(" ")
    }
}

// ============================================================================
// TESTS
// ============================================================================
