//! Progress history returned by the hint backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw `GET /progress` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub platform: String,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    #[serde(default)]
    pub history: Vec<ProgressHistoryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressHistoryEntry {
    /// Either an ISO string or an epoch number, depending on backend version
    #[serde(default)]
    pub timestamp: Value,
    pub score: Option<f64>,
}

/// One point of a progress chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
    /// Timestamp label, or `Attempt N` when the backend sent none
    pub label: String,
    pub score: f64,
}

/// Normalized progress series for one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSeries {
    pub platform: String,
    pub score: f64,
    pub feedback: Option<String>,
    pub points: Vec<ProgressPoint>,
}

impl ProgressSeries {
    pub fn empty(platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
            score: 0.0,
            feedback: None,
            points: Vec::new(),
        }
    }
}

impl From<ProgressResponse> for ProgressSeries {
    /// Scores fall back to the top-level score, then to zero.
    fn from(resp: ProgressResponse) -> Self {
        let fallback = resp.score.unwrap_or(0.0);
        let points = resp
            .history
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let label = match &entry.timestamp {
                    Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                    Value::Number(n) => n.to_string(),
                    _ => format!("Attempt {}", i + 1),
                };
                ProgressPoint {
                    label,
                    score: entry.score.unwrap_or(fallback),
                }
            })
            .collect();

        Self {
            platform: resp.platform,
            score: fallback,
            feedback: resp.feedback,
            points,
        }
    }
}
