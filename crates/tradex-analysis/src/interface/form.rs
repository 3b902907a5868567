//! Form session: the symbol input and both indicator selections

use crate::catalog::{Fundamental, Indicator, Technical};
use crate::error::Result;
use crate::request::AnalysisRequest;
use crate::selection::{IndicatorSelection, ToggleOutcome};
use serde::Serialize;

/// One selectable chip as a view renders it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub id: &'static str,
    pub selected: bool,
    /// False for unselected chips once the selection is full
    pub enabled: bool,
}

/// Editable state behind the analysis form
#[derive(Debug, Clone)]
pub struct AnalysisForm {
    symbol: String,
    fundamentals: IndicatorSelection<Fundamental>,
    technicals: IndicatorSelection<Technical>,
    include_llm: bool,
    thread_id: Option<String>,
}

impl Default for AnalysisForm {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            fundamentals: IndicatorSelection::new(),
            technicals: IndicatorSelection::new(),
            include_llm: true,
            thread_id: None,
        }
    }
}

impl AnalysisForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw symbol input; normalised only when a request is built
    pub fn set_symbol(&mut self, symbol: impl Into<String>) {
        self.symbol = symbol.into();
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn set_include_llm(&mut self, include_llm: bool) {
        self.include_llm = include_llm;
    }

    pub fn include_llm(&self) -> bool {
        self.include_llm
    }

    pub fn set_thread_id(&mut self, thread_id: Option<String>) {
        self.thread_id = thread_id;
    }

    pub fn toggle_fundamental(&mut self, indicator: Fundamental) -> ToggleOutcome {
        self.fundamentals.toggle(indicator)
    }

    pub fn toggle_technical(&mut self, indicator: Technical) -> ToggleOutcome {
        self.technicals.toggle(indicator)
    }

    /// Add without toggling; repeating an already selected indicator keeps it
    pub fn select_fundamental(&mut self, indicator: Fundamental) -> ToggleOutcome {
        self.fundamentals.select(indicator)
    }

    pub fn select_technical(&mut self, indicator: Technical) -> ToggleOutcome {
        self.technicals.select(indicator)
    }

    pub fn fundamentals(&self) -> &IndicatorSelection<Fundamental> {
        &self.fundamentals
    }

    pub fn technicals(&self) -> &IndicatorSelection<Technical> {
        &self.technicals
    }

    pub fn fundamental_chips(&self) -> Vec<Chip> {
        chips(&self.fundamentals)
    }

    pub fn technical_chips(&self) -> Vec<Chip> {
        chips(&self.technicals)
    }

    /// Build the outbound request from the current input.
    ///
    /// Fails with [`AnalysisError::InvalidSymbol`](crate::AnalysisError::InvalidSymbol)
    /// on a blank symbol.
    pub fn request(&self) -> Result<AnalysisRequest> {
        let mut request =
            AnalysisRequest::build(&self.symbol, &self.fundamentals, &self.technicals)?;
        if !self.include_llm {
            request = request.without_llm();
        }
        if let Some(thread_id) = &self.thread_id {
            request = request.with_thread_id(thread_id.clone());
        }
        Ok(request)
    }
}

fn chips<I: Indicator>(selection: &IndicatorSelection<I>) -> Vec<Chip> {
    I::catalog()
        .iter()
        .map(|&indicator| Chip {
            id: indicator.id(),
            selected: selection.contains(indicator),
            enabled: selection.is_enabled(indicator),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    #[test]
    fn test_new_form_is_empty() {
        let form = AnalysisForm::new();
        assert_eq!(form.symbol(), "");
        assert!(form.include_llm());
        assert_eq!(form.fundamentals().hint(), "Selected 0 / 5");
        assert_eq!(form.technicals().hint(), "Selected 0 / 5");
    }

    #[test]
    fn test_full_selection_disables_remaining_chips() {
        let mut form = AnalysisForm::new();
        for &indicator in &Fundamental::catalog()[..5] {
            assert_eq!(form.toggle_fundamental(indicator), ToggleOutcome::Added);
        }
        assert_eq!(
            form.toggle_fundamental(Fundamental::EvToEbitda),
            ToggleOutcome::Rejected
        );

        let chips = form.fundamental_chips();
        assert_eq!(chips.len(), 12);
        assert_eq!(chips.iter().filter(|c| c.selected).count(), 5);
        assert!(chips.iter().filter(|c| !c.selected).all(|c| !c.enabled));
        assert!(chips.iter().filter(|c| c.selected).all(|c| c.enabled));

        // Technicals are limited independently
        assert!(form.technical_chips().iter().all(|c| c.enabled));
        assert_eq!(form.toggle_technical(Technical::Macd), ToggleOutcome::Added);
    }

    #[test]
    fn test_request_from_form() {
        let mut form = AnalysisForm::new();
        form.set_symbol("  tsla ");
        form.toggle_technical(Technical::Rsi);
        form.set_include_llm(false);
        form.set_thread_id(Some("t-7".to_string()));

        let request = form.request().unwrap();
        assert_eq!(request.symbol(), "TSLA");
        assert_eq!(request.technicals(), &[Technical::Rsi]);
        assert!(!request.include_llm());
        assert_eq!(request.thread_id(), Some("t-7"));
    }

    #[test]
    fn test_blank_symbol_rejected() {
        let mut form = AnalysisForm::new();
        form.set_symbol("   ");
        assert!(matches!(form.request(), Err(AnalysisError::InvalidSymbol(_))));
    }

    #[test]
    fn test_select_does_not_deselect() {
        let mut form = AnalysisForm::new();
        form.set_symbol("aapl");
        assert_eq!(form.select_fundamental(Fundamental::Roe), ToggleOutcome::Added);
        assert_eq!(form.select_fundamental(Fundamental::Roe), ToggleOutcome::Added);
        assert_eq!(form.select_technical(Technical::Rsi), ToggleOutcome::Added);

        let request = form.request().unwrap();
        assert_eq!(request.fundamentals(), &[Fundamental::Roe]);
        assert_eq!(request.technicals(), &[Technical::Rsi]);
    }
}
