//! Session state: holdings plus analysis parameters, mirrored to a store

use crate::core::error::ValidationError;
use crate::core::holdings::{Holding, HoldingId, HoldingsLedger};
use crate::core::store::{KeyValueStore, SESSION_KEY};
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Analysis parameters sent along with the holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub benchmark: String,
    pub start_date: NaiveDate,
    /// Annual rate as a decimal fraction, e.g. 0.065 for 6.5%.
    pub risk_free_rate: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            benchmark: "^NSEI".to_string(),
            start_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default(),
            risk_free_rate: 0.065,
        }
    }
}

/// Everything persisted under [`SESSION_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub holdings: Vec<Holding>,
    pub benchmark: String,
    pub start_date: NaiveDate,
    pub risk_free_rate: f64,
}

impl SessionSnapshot {
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            benchmark: self.benchmark.clone(),
            start_date: self.start_date,
            risk_free_rate: self.risk_free_rate,
        }
    }
}

// Every field may be missing from an older or hand-edited blob.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    holdings: Option<Vec<Holding>>,
    benchmark: Option<String>,
    start_date: Option<NaiveDate>,
    risk_free_rate: Option<f64>,
}

pub struct Session {
    ledger: HoldingsLedger,
    config: SessionConfig,
    validation_error: Option<ValidationError>,
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    /// Creates an empty session without reading the store.
    pub fn new(store: Arc<dyn KeyValueStore>, defaults: SessionConfig) -> Self {
        Session {
            ledger: HoldingsLedger::new(),
            config: defaults,
            validation_error: None,
            store,
        }
    }

    /// Restores the session saved in `store`. A missing or unreadable blob
    /// yields an empty session with `defaults`.
    pub async fn load(store: Arc<dyn KeyValueStore>, defaults: SessionConfig) -> Self {
        let stored = match store.get(SESSION_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str::<StoredSession>(&blob) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!(error = %e, "Saved session is unreadable, starting fresh");
                    StoredSession::default()
                }
            },
            Ok(None) => {
                info!("No saved session found");
                StoredSession::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved session, starting fresh");
                StoredSession::default()
            }
        };

        let config = SessionConfig {
            benchmark: stored.benchmark.unwrap_or(defaults.benchmark),
            start_date: stored.start_date.unwrap_or(defaults.start_date),
            risk_free_rate: stored
                .risk_free_rate
                .filter(|rate| rate.is_finite())
                .unwrap_or(defaults.risk_free_rate),
        };
        let ledger = HoldingsLedger::from_holdings(stored.holdings.unwrap_or_default());
        debug!(holdings = ledger.len(), ?config, "Loaded session");

        Session {
            ledger,
            config,
            validation_error: None,
            store,
        }
    }

    pub fn holdings(&self) -> &[Holding] {
        self.ledger.holdings()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The error from the last rejected add, cleared by the next successful one.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            holdings: self.ledger.holdings().to_vec(),
            benchmark: self.config.benchmark.clone(),
            start_date: self.config.start_date,
            risk_free_rate: self.config.risk_free_rate,
        }
    }

    pub async fn add_holding(
        &mut self,
        ticker: &str,
        quantity_input: &str,
    ) -> Result<HoldingId, ValidationError> {
        match self.ledger.add(ticker, quantity_input) {
            Ok(id) => {
                self.validation_error = None;
                debug!(%id, ticker, "Added holding");
                self.persist().await;
                Ok(id)
            }
            Err(e) => {
                debug!(error = %e, "Rejected holding");
                self.validation_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Removes a holding; unknown ids are ignored. Returns whether anything
    /// was removed.
    pub async fn remove_holding(&mut self, id: HoldingId) -> bool {
        let removed = self.ledger.remove(id);
        debug!(%id, removed, "Remove holding");
        self.persist().await;
        removed
    }

    pub async fn set_benchmark(&mut self, symbol: &str) {
        self.config.benchmark = symbol.to_string();
        self.persist().await;
    }

    pub async fn set_start_date(&mut self, date: NaiveDate) {
        self.config.start_date = date;
        self.persist().await;
    }

    pub async fn set_risk_free_rate(&mut self, rate: f64) -> Result<(), ValidationError> {
        if !rate.is_finite() {
            return Err(ValidationError::NonFiniteRate);
        }
        self.config.risk_free_rate = rate;
        self.persist().await;
        Ok(())
    }

    async fn persist(&self) {
        if let Err(e) = self.try_persist().await {
            warn!(error = %e, "Failed to save session");
        }
    }

    async fn try_persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.snapshot())?;
        self.store.set(SESSION_KEY, &blob).await
    }
}
