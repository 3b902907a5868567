//! HTTP implementation of the analysis API

use super::AnalysisApi;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::request::AnalysisRequest;
use crate::result::{AnalysisResult, CreatedAnalysis};
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

const COLLECTION_PATH: &str = "analysis/";

/// Analysis backend client over HTTP
///
/// * `POST {base}/analysis/?symbol=..&selected_fundamentals=..` creates an analysis
/// * `GET {base}/analysis/{id}` fetches its current state
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    base: Url,
}

impl HttpAnalysisClient {
    /// Create a client from configuration
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AnalysisError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base: config.api_base_url()?,
        })
    }

    /// Create from `TRADEX_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(&AnalysisConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build (without sending) the create request
    pub fn create_request(&self, request: &AnalysisRequest) -> Result<reqwest::Request> {
        let url = self.base.join(COLLECTION_PATH)?;
        Ok(self
            .client
            .post(url)
            .query(&request.query_pairs())
            .build()?)
    }

    /// Build (without sending) the fetch request for one analysis
    pub fn fetch_request(&self, analysis_id: &str) -> Result<reqwest::Request> {
        let mut url = self.base.join(COLLECTION_PATH)?;
        url.path_segments_mut()
            .map_err(|()| {
                AnalysisError::ConfigError(format!("cannot-be-a-base URL: {}", self.base))
            })?
            .pop_if_empty()
            .push(analysis_id);
        Ok(self.client.get(url).build()?)
    }

    async fn send_create(&self, request: &AnalysisRequest) -> Result<CreatedAnalysis> {
        let http_request = self.create_request(request)?;
        let response = Self::check_status(self.client.execute(http_request).await?)?;
        Ok(response.json::<CreatedAnalysis>().await?)
    }

    async fn send_fetch(&self, analysis_id: &str) -> Result<AnalysisResult> {
        let http_request = self.fetch_request(analysis_id)?;
        let response = Self::check_status(self.client.execute(http_request).await?)?;
        let body = response.text().await?;
        Ok(AnalysisResult::from_json(&body)?)
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AnalysisError::Other(format!("HTTP error: {status}")))
        }
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn create(&self, request: &AnalysisRequest) -> Result<CreatedAnalysis> {
        debug!(symbol = request.symbol(), "POST analysis");

        match self.send_create(request).await {
            Ok(created) => {
                debug!(
                    symbol = request.symbol(),
                    analysis_id = %created.analysis_id,
                    "analysis created"
                );
                Ok(created)
            }
            Err(e) => {
                debug!(symbol = request.symbol(), error = %e, "create analysis failed");
                Err(AnalysisError::SubmissionFailed(e.to_string()))
            }
        }
    }

    async fn fetch(&self, analysis_id: &str) -> Result<AnalysisResult> {
        debug!(analysis_id, "GET analysis");

        self.send_fetch(analysis_id).await.map_err(|e| {
            debug!(analysis_id, error = %e, "fetch analysis failed");
            AnalysisError::PollFailed(e.to_string())
        })
    }
}
