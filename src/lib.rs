pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{AnalysisController, Session, SessionConfig};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Add { ticker: String, quantity: String },
    Remove { id: u64 },
    List,
    SetBenchmark(String),
    SetStartDate(NaiveDate),
    SetRiskFreeRate(f64),
    Analyze { points: usize },
    Report { points: usize },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Portfolio analyzer starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_default(&config)?;
    let mut session = Session::load(Arc::clone(&store), SessionConfig::from(&config.defaults)).await;

    match command {
        AppCommand::Add { ticker, quantity } => {
            cli::holdings::add(&mut session, &ticker, &quantity).await
        }
        AppCommand::Remove { id } => cli::holdings::remove(&mut session, id).await,
        AppCommand::List => {
            println!("{}", cli::holdings::display_session(&session));
            Ok(())
        }
        AppCommand::SetBenchmark(symbol) => {
            cli::holdings::set_benchmark(&mut session, &symbol).await
        }
        AppCommand::SetStartDate(date) => cli::holdings::set_start_date(&mut session, date).await,
        AppCommand::SetRiskFreeRate(rate) => {
            cli::holdings::set_risk_free_rate(&mut session, rate).await
        }
        AppCommand::Analyze { points } => {
            let service = providers::HttpAnalysisService::new(
                &config.service.url,
                Duration::from_secs(config.service.timeout_secs),
            )?;
            let controller = AnalysisController::new(Arc::new(service), Arc::clone(&store));
            cli::analyze::run(&session, &controller, points).await
        }
        AppCommand::Report { points } => {
            cli::analyze::report(&session, store.as_ref(), points).await
        }
    }
}
