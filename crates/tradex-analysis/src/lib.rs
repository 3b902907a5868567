//! Tradex analysis request/poll lifecycle
//!
//! This crate holds everything between the analysis form and the rendered
//! result:
//!
//! - Fixed indicator catalogs and bounded selections (at most 5 per catalog)
//! - Validated outbound requests
//! - The analysis backend client (`POST /analysis/`, `GET /analysis/{id}`)
//! - A poller that submits one analysis and fetches it on a fixed cadence
//!   until the interpretation is ready or something fails
//! - Display mapping and table/JSON renderers for partial results
//!
//! # Architecture
//!
//! [`AnalysisPoller`] owns the session. It calls [`AnalysisApi::create`],
//! then arms a single [`CadenceTimer`] that fetches immediately and every
//! poll interval afterwards. Each fetch result is published as a
//! [`PollSnapshot`] on a `tokio::sync::watch` channel; views subscribe and
//! render with [`present`] and a [`Formatter`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tradex_analysis::{
//!     AnalysisConfig, AnalysisForm, AnalysisPoller, Fundamental, HttpAnalysisClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> tradex_analysis::Result<()> {
//!     let config = AnalysisConfig::from_env()?;
//!     let client = Arc::new(HttpAnalysisClient::new(&config)?);
//!     let mut poller = AnalysisPoller::new(client, &config);
//!
//!     let mut form = AnalysisForm::new();
//!     form.set_symbol("aapl");
//!     form.toggle_fundamental(Fundamental::Roe);
//!
//!     let mut updates = poller.subscribe();
//!     poller.submit(form.request()?).await?;
//!
//!     let done = updates.wait_for(|s| s.phase.is_terminal()).await;
//!     if let Ok(snapshot) = done {
//!         println!("{}", snapshot.phase.name());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod interface;
pub mod request;
pub mod result;
pub mod selection;

pub use api::{AnalysisApi, HttpAnalysisClient};
pub use catalog::{Fundamental, Indicator, Technical, UnknownIndicator};
pub use config::AnalysisConfig;
pub use engine::{
    AnalysisPoller, AnalysisSession, CadenceTimer, FailureKind, PollSnapshot, SessionPhase,
    TimerLedger,
};
pub use error::{AnalysisError, Result};
pub use interface::{
    AnalysisForm, DisplayModel, Formatter, FormatterFactory, OutputFormat, Tone, present,
};
pub use request::AnalysisRequest;
pub use result::{AnalysisResult, CreatedAnalysis, LlmStatus};
pub use selection::{IndicatorSelection, MAX_SELECTED, ToggleOutcome};
