//! Core business logic: holdings, session state and the analysis lifecycle

pub mod analysis;
pub mod config;
pub mod controller;
pub mod error;
pub mod holdings;
pub mod log;
pub mod session;
pub mod store;

// Re-export main types for cleaner imports
pub use analysis::{AnalysisRequest, AnalysisResult, AnalysisService, ServiceReply};
pub use controller::{AnalysisController, AnalysisState, Phase};
pub use error::{AnalysisError, ValidationError};
pub use holdings::{Holding, HoldingId};
pub use session::{Session, SessionConfig, SessionSnapshot};
pub use store::KeyValueStore;
