use crate::core::analysis::{AnalysisRequest, AnalysisResult, AnalysisService, ServiceReply};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for the HTTP analysis endpoint.
pub struct HttpAnalysisService {
    url: String,
    client: reqwest::Client,
}

impl HttpAnalysisService {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("folio/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpAnalysisService {
            url: url.to_string(),
            client,
        })
    }
}

// A non-empty `error` field wins over anything else in the body.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum AnalysisResponse {
    Failure { error: String },
    Success(AnalysisResult),
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    #[instrument(name = "AnalysisRequest", skip_all, fields(url = %self.url))]
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ServiceReply> {
        debug!(?request, "Posting analysis request");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, self.url))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read analysis response")?;
        debug!(%status, bytes = response_text.len(), "Received analysis response");

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response (HTTP {})", status));
        }

        let parsed: AnalysisResponse = serde_json::from_str(&response_text).with_context(|| {
            format!("Failed to parse analysis response (HTTP {status}). Response: '{response_text}'")
        })?;

        match parsed {
            AnalysisResponse::Failure { error } if !error.is_empty() => {
                Ok(ServiceReply::Rejected(error))
            }
            AnalysisResponse::Failure { .. } => {
                let result: AnalysisResult =
                    serde_json::from_str(&response_text).with_context(|| {
                        format!("Empty error without results (HTTP {status}). Response: '{response_text}'")
                    })?;
                Ok(ServiceReply::Completed(result))
            }
            AnalysisResponse::Success(result) => Ok(ServiceReply::Completed(result)),
        }
    }
}
