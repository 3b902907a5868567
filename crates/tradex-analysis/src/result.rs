//! Wire types for the analysis resource
//!
//! The backend fills the analysis record in incrementally, so every field
//! here is optional. Fields with an unexpected JSON type are read as absent
//! instead of failing the whole payload.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Response of the create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAnalysis {
    pub analysis_id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Snapshot of an analysis as returned by the fetch call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient::record")]
    pub combined: Option<CombinedScore>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub fundamental: Option<FundamentalSummary>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub technical: Option<TechnicalSummary>,

    #[serde(default, deserialize_with = "lenient::status")]
    pub llm_status: Option<LlmStatus>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub llm_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub llm_bull_case: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub llm_bear_case: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub llm_risk_assessment: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub llm_confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub llm_ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedScore {
    #[serde(default, deserialize_with = "lenient::number")]
    pub overall_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub fundamental_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub technical_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub investment_bias: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSummary {
    #[serde(default, deserialize_with = "lenient::number")]
    pub overall_score: Option<f64>,
    /// Category name to score; non-numeric scores are dropped
    #[serde(default, deserialize_with = "lenient::scores")]
    pub category_scores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub trend_direction: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub momentum_strength: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub volatility_level: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub entry_signal: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub exit_signal: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub latest_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub overall_technical_score: Option<f64>,
}

/// Progress of the interpretation job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmStatus {
    Pending,
    Running,
    /// Written as `ready` or `completed` by the backend
    Ready,
    Failed,
    Unknown(String),
}

impl LlmStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for LlmStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => Self::Pending,
            "running" | "processing" => Self::Running,
            "ready" | "completed" | "complete" | "done" => Self::Ready,
            "failed" | "error" => Self::Failed,
            _ => Self::Unknown(raw.to_string()),
        }
    }
}

impl fmt::Display for LlmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LlmStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LlmStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

impl AnalysisResult {
    /// Parse a fetch response body
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    pub fn interpretation_failed(&self) -> bool {
        matches!(self.llm_status, Some(LlmStatus::Failed))
    }

    pub fn category_score(&self, category: &str) -> Option<f64> {
        self.fundamental
            .as_ref()
            .and_then(|f| f.category_scores.get(category).copied())
    }
}

mod lenient {
    use super::LlmStatus;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    fn value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
        Option::<Value>::deserialize(d)
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(value(d)?.and_then(|v| v.as_f64()))
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match value(d)? {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(matches!(value(d)?, Some(Value::Bool(true))))
    }

    pub fn status<'de, D: Deserializer<'de>>(d: D) -> Result<Option<LlmStatus>, D::Error> {
        Ok(value(d)?.and_then(|v| v.as_str().map(LlmStatus::from)))
    }

    pub fn scores<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, f64>, D::Error> {
        let Some(Value::Object(map)) = value(d)? else {
            return Ok(BTreeMap::new());
        };
        Ok(map
            .into_iter()
            .filter_map(|(k, v)| v.as_f64().map(|score| (k, score)))
            .collect())
    }

    pub fn record<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match value(d)? {
            Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
            _ => None,
        })
    }
}
