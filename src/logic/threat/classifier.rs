//! Zero-shot Classifier capability
//!
//! CHỈ chứa việc gọi model - không có taxonomy, không có fallback policy.
//! Input: free text + candidate labels. Output: labels ranked by score.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::types::LabelScore;
use crate::error::ClassifierError;

#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Ranked best-first
    async fn classify(&self, text: &str, candidate_labels: &[String]) -> Result<Vec<LabelScore>, ClassifierError>;
}

// ============================================================================
// DISABLED
// ============================================================================

/// No model configured
#[derive(Debug, Default)]
pub struct DisabledClassifier;

#[async_trait]
impl ZeroShotClassifier for DisabledClassifier {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn classify(&self, _text: &str, _candidate_labels: &[String]) -> Result<Vec<LabelScore>, ClassifierError> {
        Err(ClassifierError::Unavailable("no zero-shot model configured".to_string()))
    }
}

// ============================================================================
// HUGGING FACE INFERENCE API
// ============================================================================

#[derive(Debug)]
pub struct HuggingFaceClassifier {
    url: String,
    token: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
}

/// Classic pipeline format or the newer list-of-pairs format
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Pipeline { labels: Vec<String>, scores: Vec<f64> },
    Ranked(Vec<LabelScore>),
}

impl ZeroShotResponse {
    fn into_ranked(self) -> Result<Vec<LabelScore>, ClassifierError> {
        let mut ranked = match self {
            ZeroShotResponse::Pipeline { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(ClassifierError::InvalidResponse(format!(
                        "{} labels vs {} scores",
                        labels.len(),
                        scores.len()
                    )));
                }
                labels
                    .into_iter()
                    .zip(scores)
                    .map(|(label, score)| LabelScore { label, score })
                    .collect::<Vec<_>>()
            }
            ZeroShotResponse::Ranked(ranked) => ranked,
        };

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }
}

impl HuggingFaceClassifier {
    pub fn new(url: &str, token: &str, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.to_string(),
            token: token.to_string(),
            client,
        })
    }
}

#[async_trait]
impl ZeroShotClassifier for HuggingFaceClassifier {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, text: &str, candidate_labels: &[String]) -> Result<Vec<LabelScore>, ClassifierError> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters { candidate_labels },
        };

        let response = self.client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifierError::Status(response.status().as_u16()));
        }

        let parsed: ZeroShotResponse = response.json().await?;
        parsed.into_ranked()
    }
}

// ============================================================================
// TESTS
// ============================================================================
