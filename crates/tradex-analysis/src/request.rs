//! Outbound analysis request

use crate::catalog::{Fundamental, Indicator, Technical};
use crate::error::{AnalysisError, Result};
use crate::selection::IndicatorSelection;
use serde::Serialize;

/// A validated request for a new analysis.
///
/// Only [`AnalysisRequest::build`] creates one, so `symbol` is always
/// trimmed, upper-cased and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    symbol: String,
    selected_fundamentals: Vec<Fundamental>,
    selected_technicals: Vec<Technical>,
    include_llm: bool,
    thread_id: Option<String>,
}

impl AnalysisRequest {
    /// Normalize the symbol and attach both selections.
    ///
    /// A symbol that is blank after trimming is rejected with
    /// [`AnalysisError::InvalidSymbol`]; nothing should be sent in that case.
    /// Empty selections are valid and leave the choice to the server.
    pub fn build(
        raw_symbol: &str,
        fundamentals: &IndicatorSelection<Fundamental>,
        technicals: &IndicatorSelection<Technical>,
    ) -> Result<Self> {
        let symbol = raw_symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(AnalysisError::InvalidSymbol(raw_symbol.to_string()));
        }

        Ok(Self {
            symbol,
            selected_fundamentals: fundamentals.iter().collect(),
            selected_technicals: technicals.iter().collect(),
            include_llm: true,
            thread_id: None,
        })
    }

    /// Skip the interpretation step; the first fetched result is then final
    pub fn without_llm(mut self) -> Self {
        self.include_llm = false;
        self
    }

    /// Attach the analysis to an existing conversation thread
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        let thread_id = thread_id.into();
        self.thread_id = (!thread_id.trim().is_empty()).then_some(thread_id);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn fundamentals(&self) -> &[Fundamental] {
        &self.selected_fundamentals
    }

    pub fn technicals(&self) -> &[Technical] {
        &self.selected_technicals
    }

    pub fn include_llm(&self) -> bool {
        self.include_llm
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Query parameters exactly as sent to the create endpoint.
    ///
    /// Each indicator is its own `selected_*` pair rather than one joined
    /// string. `include_llm` is only sent when disabled since the server
    /// defaults it to true.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(
            1 + self.selected_fundamentals.len() + self.selected_technicals.len() + 2,
        );
        pairs.push(("symbol", self.symbol.clone()));
        pairs.extend(
            self.selected_fundamentals
                .iter()
                .map(|f| (Fundamental::QUERY_PARAM, f.id().to_string())),
        );
        pairs.extend(
            self.selected_technicals
                .iter()
                .map(|t| (Technical::QUERY_PARAM, t.id().to_string())),
        );
        if !self.include_llm {
            pairs.push(("include_llm", "false".to_string()));
        }
        if let Some(thread_id) = &self.thread_id {
            pairs.push(("thread_id", thread_id.clone()));
        }
        pairs
    }
}
