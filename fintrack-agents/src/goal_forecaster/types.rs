use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shared_types::PredictionNarrative;

/// Output shape requested from the model. Only the three narrative lists are
/// kept; the numeric fields let the model show its reading of the plan but are
/// never copied onto a prediction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NarrativeResponse {
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_completion_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_monthly_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_monthly_amount: Option<f64>,
    #[serde(default)]
    pub ai_insights: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
}

impl From<NarrativeResponse> for PredictionNarrative {
    fn from(response: NarrativeResponse) -> Self {
        let clean = |items: Vec<String>| {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        PredictionNarrative {
            ai_insights: clean(response.ai_insights),
            risk_factors: clean(response.risk_factors),
            opportunities: clean(response.opportunities),
        }
    }
}

/// Limits applied to each narrative request
#[derive(Debug, Clone)]
pub struct NarrativeOptions {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: std::time::Duration,
    pub retry_backoff: std::time::Duration,
}

impl Default for NarrativeOptions {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 1024,
            timeout: std::time::Duration::from_secs(20),
            retry_backoff: std::time::Duration::from_millis(500),
        }
    }
}
