//! Client for the analysis backend
//!
//! The poller only ever talks to the backend through [`AnalysisApi`], which
//! keeps the transport swappable and lets tests script responses.

pub mod http;

use crate::error::Result;
use crate::request::AnalysisRequest;
use crate::result::{AnalysisResult, CreatedAnalysis};
use async_trait::async_trait;

pub use http::HttpAnalysisClient;

/// The two operations the request/poll lifecycle depends on.
///
/// Implementations perform exactly one remote call per invocation and never
/// retry. `create` failures are reported as
/// [`AnalysisError::SubmissionFailed`](crate::AnalysisError::SubmissionFailed),
/// `fetch` failures as [`AnalysisError::PollFailed`](crate::AnalysisError::PollFailed).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Start a new analysis and return its server-issued id
    async fn create(&self, request: &AnalysisRequest) -> Result<CreatedAnalysis>;

    /// Fetch the current state of an analysis
    async fn fetch(&self, analysis_id: &str) -> Result<AnalysisResult>;
}
