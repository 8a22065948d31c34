//! Terminal presentation of the session and analysis results

pub mod analyze;
pub mod holdings;
pub mod setup;
pub mod ui;
