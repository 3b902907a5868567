//! Session value objects shared between the poller and its observers

use crate::request::AnalysisRequest;
use crate::result::{AnalysisResult, CreatedAnalysis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which remote call ended a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The create call failed
    Submission,
    /// A fetch call failed while polling
    Poll,
}

impl FailureKind {
    /// Generic user-facing message; transport detail is never shown
    pub fn message(self) -> &'static str {
        match self {
            Self::Submission => "Failed to start analysis.",
            Self::Poll => "Failed to fetch analysis.",
        }
    }
}

/// Lifecycle phase of the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Submitting {
        symbol: String,
    },
    Polling {
        analysis_id: String,
    },
    Ready {
        analysis_id: String,
    },
    Failed {
        analysis_id: Option<String>,
        kind: FailureKind,
    },
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::Failed { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitting { .. } | Self::Polling { .. })
    }

    pub fn analysis_id(&self) -> Option<&str> {
        match self {
            Self::Polling { analysis_id } | Self::Ready { analysis_id } => Some(analysis_id),
            Self::Failed { analysis_id, .. } => analysis_id.as_deref(),
            Self::Idle | Self::Submitting { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting { .. } => "submitting",
            Self::Polling { .. } => "polling",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }

    /// Status line for the current phase, if any
    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            Self::Idle | Self::Ready { .. } => None,
            Self::Submitting { .. } => Some("Starting analysis..."),
            Self::Polling { .. } => Some("Waiting for interpretation..."),
            Self::Failed { kind, .. } => Some(kind.message()),
        }
    }
}

/// One create → poll → terminal lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisSession {
    /// Monotonic per-poller counter; a newer session always has a larger one
    pub generation: u64,
    pub analysis_id: String,
    pub symbol: String,
    pub thread_id: Option<String>,
    pub include_llm: bool,
    pub started_at: DateTime<Utc>,
}

impl AnalysisSession {
    pub fn new(generation: u64, created: CreatedAnalysis, request: &AnalysisRequest) -> Self {
        Self {
            generation,
            analysis_id: created.analysis_id,
            symbol: request.symbol().to_string(),
            thread_id: created
                .thread_id
                .or_else(|| request.thread_id().map(str::to_string)),
            include_llm: request.include_llm(),
            started_at: Utc::now(),
        }
    }

    /// Whether `result` ends this session's polling.
    ///
    /// Polling completes when the interpretation is ready, when no
    /// interpretation was requested, or (if `stop_on_llm_failure`) when the
    /// backend reports the interpretation as failed.
    pub fn is_complete(&self, result: &AnalysisResult, stop_on_llm_failure: bool) -> bool {
        result.llm_ready
            || !self.include_llm
            || (stop_on_llm_failure && result.interpretation_failed())
    }
}

/// What observers see of the poller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollSnapshot {
    pub generation: u64,
    pub phase: SessionPhase,
    /// Latest successfully fetched result of the current session
    pub result: Option<AnalysisResult>,
    /// Number of results applied in the current session
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

impl Default for PollSnapshot {
    fn default() -> Self {
        Self {
            generation: 0,
            phase: SessionPhase::Idle,
            result: None,
            revision: 0,
            updated_at: Utc::now(),
        }
    }
}

impl PollSnapshot {
    /// Fresh snapshot for a new session; the previous result is discarded
    pub fn submitting(generation: u64, symbol: &str) -> Self {
        Self {
            generation,
            phase: SessionPhase::Submitting {
                symbol: symbol.to_string(),
            },
            ..Self::default()
        }
    }

    pub(crate) fn enter_polling(&mut self, analysis_id: &str) {
        self.phase = SessionPhase::Polling {
            analysis_id: analysis_id.to_string(),
        };
        self.touch();
    }

    pub(crate) fn apply_result(&mut self, result: AnalysisResult, complete: bool) {
        self.result = Some(result);
        self.revision += 1;
        if complete {
            if let Some(analysis_id) = self.phase.analysis_id().map(str::to_string) {
                self.phase = SessionPhase::Ready { analysis_id };
            }
        }
        self.touch();
    }

    /// Move to `Failed`; any result already shown is kept
    pub(crate) fn fail(&mut self, kind: FailureKind) {
        self.phase = SessionPhase::Failed {
            analysis_id: self.phase.analysis_id().map(str::to_string),
            kind,
        };
        self.touch();
    }

    pub(crate) fn go_idle(&mut self) {
        self.phase = SessionPhase::Idle;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::IndicatorSelection;

    fn request(include_llm: bool) -> AnalysisRequest {
        let request =
            AnalysisRequest::build("aapl", &IndicatorSelection::new(), &IndicatorSelection::new())
                .unwrap();
        if include_llm { request } else { request.without_llm() }
    }

    fn session(include_llm: bool) -> AnalysisSession {
        let created = CreatedAnalysis {
            analysis_id: "a-1".to_string(),
            thread_id: Some("t-1".to_string()),
            status: Some("processing".to_string()),
        };
        AnalysisSession::new(1, created, &request(include_llm))
    }

    #[test]
    fn test_completion_predicate() {
        let session = session(true);
        let mut result = AnalysisResult::default();
        assert!(!session.is_complete(&result, true));

        result.llm_status = Some(crate::result::LlmStatus::Failed);
        assert!(session.is_complete(&result, true));
        assert!(!session.is_complete(&result, false));

        result.llm_ready = true;
        assert!(session.is_complete(&result, false));
    }

    #[test]
    fn test_without_llm_completes_on_first_result() {
        let session = session(false);
        assert!(session.is_complete(&AnalysisResult::default(), false));
        assert_eq!(session.thread_id.as_deref(), Some("t-1"));
    }

    #[test]
    fn test_snapshot_transitions() {
        let mut snapshot = PollSnapshot::submitting(3, "AAPL");
        assert_eq!(snapshot.phase.status_message(), Some("Starting analysis..."));
        assert!(snapshot.phase.is_active());

        snapshot.enter_polling("a-1");
        snapshot.apply_result(AnalysisResult::default(), false);
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.phase.name(), "polling");

        snapshot.fail(FailureKind::Poll);
        assert!(snapshot.result.is_some());
        assert_eq!(snapshot.phase.analysis_id(), Some("a-1"));
        assert_eq!(snapshot.phase.status_message(), Some("Failed to fetch analysis."));
        assert!(snapshot.phase.is_terminal());
    }

    #[test]
    fn test_completed_result_moves_to_ready() {
        let mut snapshot = PollSnapshot::submitting(1, "AAPL");
        snapshot.enter_polling("a-9");
        snapshot.apply_result(AnalysisResult::default(), true);
        assert_eq!(
            snapshot.phase,
            SessionPhase::Ready {
                analysis_id: "a-9".to_string()
            }
        );
        assert_eq!(snapshot.phase.status_message(), None);
    }
}
