//! Analysis request lifecycle: validation, the remote call and the visible
//! state subscribers observe.

use crate::core::analysis::{AnalysisRequest, AnalysisResult, AnalysisService, ServiceReply};
use crate::core::error::{AnalysisError, TRANSPORT_ERROR_MESSAGE, ValidationError};
use crate::core::session::SessionSnapshot;
use crate::core::store::{KeyValueStore, RESULTS_KEY};
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// What a presentation layer renders.
///
/// `result` survives a transport failure, so it may be present while `phase`
/// is `Error`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub phase: Phase,
    pub error: Option<String>,
    pub result: Option<AnalysisResult>,
}

pub struct AnalysisController {
    service: Arc<dyn AnalysisService>,
    store: Arc<dyn KeyValueStore>,
    // Token of the most recently started analysis. Only bumped while the
    // state channel's write lock is held.
    sequence: AtomicU64,
    state: watch::Sender<AnalysisState>,
    // Serializes result writes so an older result never lands after a newer one.
    save_lock: Mutex<()>,
}

impl AnalysisController {
    pub fn new(service: Arc<dyn AnalysisService>, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(AnalysisState::default());
        AnalysisController {
            service,
            store,
            sequence: AtomicU64::new(0),
            state,
            save_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    /// Analyzes the holdings and parameters in `snapshot`.
    ///
    /// Only the most recently started call may change the visible state; an
    /// older call finishing late returns [`AnalysisError::Superseded`].
    #[instrument(skip_all, fields(holdings = snapshot.holdings.len()))]
    pub async fn run_analysis(
        &self,
        snapshot: &SessionSnapshot,
    ) -> Result<AnalysisResult, AnalysisError> {
        if snapshot.holdings.is_empty() {
            let error = ValidationError::EmptyPortfolio;
            self.state.send_modify(|state| {
                self.sequence.fetch_add(1, Ordering::SeqCst);
                state.phase = Phase::Error;
                state.error = Some(error.to_string());
            });
            debug!("Refusing to analyze an empty portfolio");
            return Err(error.into());
        }

        let mut token = 0;
        self.state.send_modify(|state| {
            token = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            state.phase = Phase::Loading;
            state.error = None;
        });

        let request = AnalysisRequest::from_snapshot(snapshot);
        info!(token, benchmark = %request.benchmark, "Starting analysis");
        let reply = self.service.analyze(&request).await;

        let mut outcome = None;
        self.state.send_if_modified(|state| {
            if self.sequence.load(Ordering::SeqCst) != token {
                return false;
            }
            outcome = Some(match reply {
                Ok(ServiceReply::Completed(result)) => {
                    state.phase = Phase::Success;
                    state.error = None;
                    state.result = Some(result.clone());
                    Ok(result)
                }
                Ok(ServiceReply::Rejected(message)) => {
                    state.phase = Phase::Error;
                    state.error = Some(message.clone());
                    state.result = None;
                    Err(AnalysisError::Service(message))
                }
                Err(e) => {
                    state.phase = Phase::Error;
                    state.error = Some(TRANSPORT_ERROR_MESSAGE.to_string());
                    Err(AnalysisError::Transport(e))
                }
            });
            true
        });

        match outcome {
            None => {
                debug!(token, "Discarding outcome of superseded analysis");
                Err(AnalysisError::Superseded)
            }
            Some(Ok(result)) => {
                info!(token, "Analysis completed");
                self.save_result(token, &result).await;
                Ok(result)
            }
            Some(Err(e)) => {
                warn!(token, error = ?e, "Analysis failed");
                Err(e)
            }
        }
    }

    async fn save_result(&self, token: u64, result: &AnalysisResult) {
        let _guard = self.save_lock.lock().await;
        if self.sequence.load(Ordering::SeqCst) != token {
            debug!(token, "Skipping save of superseded result");
            return;
        }
        let saved = match serde_json::to_string(result) {
            Ok(blob) => self.store.set(RESULTS_KEY, &blob).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = saved {
            warn!(error = %e, "Failed to save analysis result");
        }
    }
}

/// Reads the result saved by the last successful analysis, if any.
pub async fn last_saved_result(store: &dyn KeyValueStore) -> Result<Option<AnalysisResult>> {
    match store.get(RESULTS_KEY).await? {
        Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
        None => Ok(None),
    }
}
