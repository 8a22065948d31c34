//! Analysis request/response types and the remote service abstraction

use crate::core::session::SessionSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Body posted to the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub holdings: BTreeMap<String, f64>,
    pub benchmark: String,
    pub start_date: NaiveDate,
    pub risk_free_rate: f64,
}

impl AnalysisRequest {
    /// Collapses holdings into a ticker to quantity map. When a ticker occurs
    /// more than once the last holding wins.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let mut holdings = BTreeMap::new();
        for holding in &snapshot.holdings {
            if let Some(previous) = holdings.insert(holding.ticker.clone(), holding.quantity) {
                warn!(
                    ticker = %holding.ticker,
                    previous,
                    quantity = holding.quantity,
                    "Duplicate ticker in holdings, keeping the later quantity"
                );
            }
        }

        AnalysisRequest {
            holdings,
            benchmark: snapshot.benchmark.clone(),
            start_date: snapshot.start_date,
            risk_free_rate: snapshot.risk_free_rate,
        }
    }
}

/// Risk/return figures for one value series. All values except the Sharpe
/// ratio are decimal fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub cagr: f64,
    #[serde(rename = "annual_vol")]
    pub annual_volatility: f64,
    #[serde(rename = "sharpe")]
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    #[serde(rename = "portfolio")]
    pub portfolio_value: f64,
    #[serde(rename = "benchmark")]
    pub benchmark_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub portfolio: Metrics,
    pub benchmark: Metrics,
    #[serde(rename = "chart_data", default)]
    pub chart_series: Vec<ChartPoint>,
}

/// A well-formed answer from the analysis service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply {
    Completed(AnalysisResult),
    /// The service understood the request but refused it, with its message.
    Rejected(String),
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Runs the analysis remotely. `Err` means the service could not be
    /// reached or its answer could not be understood.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ServiceReply>;
}
