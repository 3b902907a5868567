//! Rendering of display models and poll snapshots

use super::display::{DisplayModel, InterpretationStatus, Section, Tone, present};
use super::form::Chip;
use crate::engine::{PollSnapshot, SessionPhase};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;

/// Output flavour selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub trait Formatter: Send + Sync {
    fn output_format(&self) -> OutputFormat;
    fn format_result(&self, model: &DisplayModel) -> String;
    /// Status line plus the current result, if any
    fn format_snapshot(&self, snapshot: &PollSnapshot) -> String;
    fn format_catalog(&self, fundamentals: &[Chip], technicals: &[Chip]) -> String;
    fn format_error(&self, error: &str) -> String;
}

/// Human readable status line for a snapshot
pub fn status_line(snapshot: &PollSnapshot) -> Option<String> {
    let message = snapshot.phase.status_message()?;
    Some(match &snapshot.phase {
        SessionPhase::Submitting { symbol } => format!("{symbol}: {message}"),
        _ => match snapshot.phase.analysis_id() {
            Some(id) => format!("[{id}] {message}"),
            None => message.to_string(),
        },
    })
}

pub struct TableFormatter;

impl TableFormatter {
    fn section_table(section: &Section) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![Cell::new(section.title), Cell::new("")]);

        for field in &section.fields {
            let value = match field.tone {
                Some(tone) => Cell::new(format!("{} {}", tone_marker(tone), field.value))
                    .fg(tone_color(tone)),
                None => Cell::new(&field.value),
            };
            table.add_row(vec![Cell::new(field.label), value]);
        }
        table
    }

    fn chip_table(title: &str, chips: &[Chip]) -> Table {
        let selected = chips.iter().filter(|c| c.selected).count();
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec![format!("{title} ({selected} selected)"), String::new()]);

        for chip in chips {
            let mark = if chip.selected {
                "[x]"
            } else if chip.enabled {
                "[ ]"
            } else {
                "[-]"
            };
            table.add_row(vec![mark, chip.id]);
        }
        table
    }
}

impl Formatter for TableFormatter {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::Table
    }

    fn format_result(&self, model: &DisplayModel) -> String {
        let mut output = String::new();
        for section in model.sections() {
            output.push_str(&Self::section_table(section).to_string());
            output.push('\n');
        }

        let status = model.interpretation_status;
        let mut indicator = Table::new();
        indicator.load_preset(UTF8_FULL).add_row(vec![
            Cell::new("Interpretation status"),
            Cell::new(status.label()).fg(status_color(status)),
        ]);
        output.push_str(&indicator.to_string());
        output
    }

    fn format_snapshot(&self, snapshot: &PollSnapshot) -> String {
        let mut output = String::new();
        if let Some(line) = status_line(snapshot) {
            output.push_str(&line);
            output.push('\n');
        }
        if let Some(model) = present(snapshot.result.as_ref()) {
            output.push_str(&self.format_result(&model));
            output.push('\n');
        }
        output
    }

    fn format_catalog(&self, fundamentals: &[Chip], technicals: &[Chip]) -> String {
        format!(
            "{}\n{}",
            Self::chip_table("Fundamentals", fundamentals),
            Self::chip_table("Technicals", technicals)
        )
    }

    fn format_error(&self, error: &str) -> String {
        format!("❌ Error: {error}")
    }
}

pub struct JsonFormatter;

#[derive(Serialize)]
struct SnapshotView<'a> {
    phase: &'a SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    revision: u64,
    updated_at: String,
    result: Option<DisplayModel>,
}

#[derive(Serialize)]
struct CatalogView<'a> {
    fundamentals: &'a [Chip],
    technicals: &'a [Chip],
}

impl JsonFormatter {
    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

impl Formatter for JsonFormatter {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn format_result(&self, model: &DisplayModel) -> String {
        Self::to_json(model)
    }

    fn format_snapshot(&self, snapshot: &PollSnapshot) -> String {
        Self::to_json(&SnapshotView {
            phase: &snapshot.phase,
            status: status_line(snapshot),
            revision: snapshot.revision,
            updated_at: snapshot.updated_at.to_rfc3339(),
            result: present(snapshot.result.as_ref()),
        })
    }

    fn format_catalog(&self, fundamentals: &[Chip], technicals: &[Chip]) -> String {
        Self::to_json(&CatalogView {
            fundamentals,
            technicals,
        })
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({ "error": error }).to_string()
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(format: OutputFormat) -> Box<dyn Formatter> {
        match format {
            OutputFormat::Table => Box::new(TableFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Bullish => "▲",
        Tone::Bearish => "▼",
        Tone::Neutral => "●",
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Bullish => Color::Green,
        Tone::Bearish => Color::Red,
        Tone::Neutral => Color::Yellow,
    }
}

fn status_color(status: InterpretationStatus) -> Color {
    match status {
        InterpretationStatus::Ready => Color::Green,
        InterpretationStatus::Failed => Color::Red,
        InterpretationStatus::Pending | InterpretationStatus::Running => Color::Yellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FailureKind;
    use crate::result::{AnalysisResult, CombinedScore, LlmStatus};

    fn snapshot(phase: SessionPhase, result: Option<AnalysisResult>) -> PollSnapshot {
        PollSnapshot {
            phase,
            result,
            ..PollSnapshot::default()
        }
    }

    fn bearish() -> AnalysisResult {
        AnalysisResult {
            combined: Some(CombinedScore {
                overall_score: Some(3.456),
                investment_bias: Some("Bearish".to_string()),
                ..CombinedScore::default()
            }),
            llm_status: Some(LlmStatus::Failed),
            ..AnalysisResult::default()
        }
    }

    #[test]
    fn test_status_lines() {
        let submitting = snapshot(
            SessionPhase::Submitting {
                symbol: "AAPL".to_string(),
            },
            None,
        );
        assert_eq!(
            status_line(&submitting).as_deref(),
            Some("AAPL: Starting analysis...")
        );

        let failed = snapshot(
            SessionPhase::Failed {
                analysis_id: None,
                kind: FailureKind::Submission,
            },
            None,
        );
        assert_eq!(
            status_line(&failed).as_deref(),
            Some("Failed to start analysis.")
        );

        let ready = snapshot(
            SessionPhase::Ready {
                analysis_id: "a-1".to_string(),
            },
            None,
        );
        assert_eq!(status_line(&ready), None);
        assert_eq!(status_line(&PollSnapshot::default()), None);
    }

    #[test]
    fn test_table_snapshot() {
        let formatter = FormatterFactory::create(OutputFormat::Table);
        assert_eq!(formatter.output_format(), OutputFormat::Table);

        let output = formatter.format_snapshot(&snapshot(
            SessionPhase::Polling {
                analysis_id: "a-1".to_string(),
            },
            Some(bearish()),
        ));

        assert!(output.starts_with("[a-1] Waiting for interpretation..."));
        assert!(output.contains("3.46"));
        assert!(output.contains("▼ Bearish"));
        assert!(output.contains("Executive Summary"));
        assert!(output.contains("Pending"));
        assert!(output.contains("Failed"));
    }

    #[test]
    fn test_table_without_result_is_status_only() {
        let output = TableFormatter.format_snapshot(&snapshot(
            SessionPhase::Failed {
                analysis_id: None,
                kind: FailureKind::Submission,
            },
            None,
        ));
        assert_eq!(output, "Failed to start analysis.\n");
    }

    #[test]
    fn test_json_snapshot() {
        let output = JsonFormatter.format_snapshot(&snapshot(
            SessionPhase::Ready {
                analysis_id: "a-1".to_string(),
            },
            Some(bearish()),
        ));

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["phase"]["phase"], "ready");
        assert_eq!(value["phase"]["analysis_id"], "a-1");
        assert!(value.get("status").is_none());
        assert_eq!(value["result"]["combined"]["fields"][0]["value"], "3.46");
        assert_eq!(value["result"]["combined"]["fields"][0]["tone"], "bearish");
        assert_eq!(value["result"]["interpretation_status"], "failed");
    }

    #[test]
    fn test_catalog_rendering() {
        let chips = vec![
            Chip {
                id: "roe",
                selected: true,
                enabled: true,
            },
            Chip {
                id: "roa",
                selected: false,
                enabled: false,
            },
        ];

        let table = TableFormatter.format_catalog(&chips, &[]);
        assert!(table.contains("Fundamentals (1 selected)"));
        assert!(table.contains("[x]"));
        assert!(table.contains("[-]"));

        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_catalog(&chips, &[])).unwrap();
        assert_eq!(json["fundamentals"][1]["enabled"], false);
        assert_eq!(json["technicals"].as_array().map(Vec::len), Some(0));
    }
}
