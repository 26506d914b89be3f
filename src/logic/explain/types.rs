use serde::{Deserialize, Serialize};

/// Which strategy produced the importances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplainMethod {
    Attribution,
    Correlation,
    None,
    Error,
}

impl ExplainMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplainMethod::Attribution => "attribution",
            ExplainMethod::Correlation => "correlation",
            ExplainMethod::None => "none",
            ExplainMethod::Error => "error",
        }
    }
}

impl std::fmt::Display for ExplainMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub method: ExplainMethod,
    /// One weight per feature column; sums to 1 unless all-zero
    pub feature_importances: Vec<f64>,
}

impl Explanation {
    pub fn none() -> Self {
        Self {
            method: ExplainMethod::None,
            feature_importances: Vec::new(),
        }
    }

    pub fn error() -> Self {
        Self {
            method: ExplainMethod::Error,
            feature_importances: Vec::new(),
        }
    }

    /// Named contributions, largest first, zero weights dropped
    pub fn top_contributions(&self, names: &[String], k: usize) -> Vec<FeatureContribution> {
        let mut contributions: Vec<FeatureContribution> = names
            .iter()
            .zip(self.feature_importances.iter())
            .filter(|(_, &w)| w > 0.0)
            .map(|(name, &importance)| FeatureContribution {
                name: name.clone(),
                importance,
                description: describe(name),
            })
            .collect();

        contributions.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        contributions.truncate(k);
        contributions
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    pub importance: f64,
    pub description: Option<String>,
}

fn describe(name: &str) -> Option<String> {
    match name {
        "length" => Some("Unusual payload size".to_string()),
        "src_port" => Some("Atypical source port".to_string()),
        "dst_port" => Some("Uncommon destination service".to_string()),
        "protocol_num" => Some("Rare protocol for this batch".to_string()),
        "hour" => Some("Activity at an unusual hour".to_string()),
        _ => None,
    }
}
