//! Display mapping for analysis results
//!
//! [`present`] turns a (possibly partial) [`AnalysisResult`] into labelled
//! sections a renderer can print as-is. Absent numbers render as `-`,
//! absent interpretation text as `Pending`. Empty strings count as absent.

use crate::result::{AnalysisResult, LlmStatus};
use serde::Serialize;

/// Shown for a missing score or label
pub const MISSING: &str = "-";

/// Shown for interpretation text that hasn't arrived yet
pub const PENDING: &str = "Pending";

/// Fundamental categories in display order: (`category_scores` key, label)
pub const CATEGORIES: [(&str, &str); 4] = [
    ("profitability", "Profitability"),
    ("growth", "Growth"),
    ("financial_strength", "Financial Strength"),
    ("valuation", "Valuation"),
];

/// Directional colouring derived from the investment bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Bullish,
    Bearish,
    Neutral,
}

impl Tone {
    /// Classify a free-form bias label.
    ///
    /// Case-insensitive substring match; "bear" wins over "bull" when a
    /// label mentions both.
    pub fn from_bias(bias: Option<&str>) -> Self {
        let Some(bias) = bias else {
            return Self::Neutral;
        };
        let bias = bias.to_lowercase();
        if bias.contains("bear") {
            Self::Bearish
        } else if bias.contains("bull") {
            Self::Bullish
        } else {
            Self::Neutral
        }
    }
}

/// Interpretation progress as shown next to the narrative fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretationStatus {
    Pending,
    Running,
    Ready,
    Failed,
}

impl InterpretationStatus {
    pub fn of(result: &AnalysisResult) -> Self {
        if result.llm_ready {
            return Self::Ready;
        }
        match result.llm_status {
            Some(LlmStatus::Running) => Self::Running,
            Some(LlmStatus::Ready) => Self::Ready,
            Some(LlmStatus::Failed) => Self::Failed,
            Some(LlmStatus::Pending | LlmStatus::Unknown(_)) | None => Self::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        }
    }

    /// Failed is the only error state; everything else is progress
    pub fn is_error(self) -> bool {
        self == Self::Failed
    }
}

/// One labelled value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
}

impl Field {
    fn plain(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            tone: None,
        }
    }

    fn toned(label: &'static str, value: String, tone: Tone) -> Self {
        Self {
            label,
            value,
            tone: Some(tone),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub fields: Vec<Field>,
}

impl Section {
    /// Value of the field labelled `label`
    pub fn value(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    pub fn field(&self, label: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label == label)
    }
}

/// Everything a view needs to render one result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub combined: Section,
    pub fundamentals: Section,
    pub technicals: Section,
    pub interpretation: Section,
    pub interpretation_status: InterpretationStatus,
}

impl DisplayModel {
    /// Sections in display order
    pub fn sections(&self) -> [&Section; 4] {
        [
            &self.combined,
            &self.fundamentals,
            &self.technicals,
            &self.interpretation,
        ]
    }

    pub fn bias_tone(&self) -> Tone {
        self.combined
            .field("Bias")
            .and_then(|f| f.tone)
            .unwrap_or(Tone::Neutral)
    }
}

/// Map a result into its display model; no result means nothing to render
pub fn present(result: Option<&AnalysisResult>) -> Option<DisplayModel> {
    let result = result?;

    let combined = result.combined.as_ref();
    let bias = combined.and_then(|c| present_str(c.investment_bias.as_deref()));
    let tone = Tone::from_bias(bias);

    let combined = Section {
        title: "Combined",
        fields: vec![
            Field::toned(
                "Overall",
                format_score(combined.and_then(|c| c.overall_score)),
                tone,
            ),
            Field::toned("Bias", text_or(bias, MISSING), tone),
            Field::plain(
                "Confidence",
                text_or(combined.and_then(|c| c.confidence.as_deref()), MISSING),
            ),
            Field::plain(
                "Fundamental",
                format_score(combined.and_then(|c| c.fundamental_score)),
            ),
            Field::plain(
                "Technical",
                format_score(combined.and_then(|c| c.technical_score)),
            ),
        ],
    };

    let mut fundamental_fields = vec![Field::plain(
        "Overall",
        format_score(result.fundamental.as_ref().and_then(|f| f.overall_score)),
    )];
    fundamental_fields.extend(
        CATEGORIES
            .iter()
            .map(|&(key, label)| Field::plain(label, format_score(result.category_score(key)))),
    );

    let technical = result.technical.as_ref();
    let technicals = Section {
        title: "Technicals",
        fields: vec![
            Field::plain(
                "Trend",
                text_or(technical.and_then(|t| t.trend_direction.as_deref()), MISSING),
            ),
            Field::plain(
                "Momentum",
                text_or(technical.and_then(|t| t.momentum_strength.as_deref()), MISSING),
            ),
            Field::plain(
                "Volatility",
                text_or(technical.and_then(|t| t.volatility_level.as_deref()), MISSING),
            ),
            Field::plain(
                "Entry",
                text_or(technical.and_then(|t| t.entry_signal.as_deref()), MISSING),
            ),
            Field::plain(
                "Exit",
                text_or(technical.and_then(|t| t.exit_signal.as_deref()), MISSING),
            ),
        ],
    };

    let interpretation = Section {
        title: "Interpretation",
        fields: vec![
            Field::plain("Executive Summary", text_or(result.llm_summary.as_deref(), PENDING)),
            Field::plain("Bull Case", text_or(result.llm_bull_case.as_deref(), PENDING)),
            Field::plain("Bear Case", text_or(result.llm_bear_case.as_deref(), PENDING)),
            Field::plain(
                "Risk Assessment",
                text_or(result.llm_risk_assessment.as_deref(), PENDING),
            ),
            Field::plain("Confidence", text_or(result.llm_confidence.as_deref(), PENDING)),
        ],
    };

    Some(DisplayModel {
        combined,
        fundamentals: Section {
            title: "Fundamentals",
            fields: fundamental_fields,
        },
        technicals,
        interpretation,
        interpretation_status: InterpretationStatus::of(result),
    })
}

/// Two decimals, or `-` when the score is missing
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) if value.is_finite() => format!("{value:.2}"),
        _ => MISSING.to_string(),
    }
}

fn present_str(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

fn text_or(text: Option<&str>, placeholder: &str) -> String {
    present_str(text).unwrap_or(placeholder).to_string()
}
