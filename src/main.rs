use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use folio::cli::analyze::DEFAULT_CHART_POINTS;
use folio::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Add a stock holding
    Add {
        /// Ticker symbol, e.g. HFCL.NS
        ticker: String,
        /// Number of shares
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Remove a holding by id
    Remove { id: u64 },
    /// Show holdings and analysis parameters
    List,
    /// Change an analysis parameter
    Set {
        #[command(subcommand)]
        parameter: Parameter,
    },
    /// Analyze the portfolio against the benchmark
    Analyze {
        /// Maximum number of chart points to display
        #[arg(short, long, default_value_t = DEFAULT_CHART_POINTS)]
        points: usize,
    },
    /// Show the last saved analysis
    Report {
        /// Maximum number of chart points to display
        #[arg(short, long, default_value_t = DEFAULT_CHART_POINTS)]
        points: usize,
    },
}

#[derive(Subcommand)]
enum Parameter {
    /// Benchmark index symbol, e.g. ^NSEI
    Benchmark { symbol: String },
    /// First day of the analysis window (YYYY-MM-DD)
    StartDate { date: NaiveDate },
    /// Annual risk-free rate as a decimal fraction, e.g. 0.065
    RiskFreeRate {
        #[arg(allow_hyphen_values = true)]
        rate: f64,
    },
}

impl From<Commands> for folio::AppCommand {
    fn from(cmd: Commands) -> folio::AppCommand {
        match cmd {
            Commands::Add { ticker, quantity } => folio::AppCommand::Add { ticker, quantity },
            Commands::Remove { id } => folio::AppCommand::Remove { id },
            Commands::List => folio::AppCommand::List,
            Commands::Set { parameter } => match parameter {
                Parameter::Benchmark { symbol } => folio::AppCommand::SetBenchmark(symbol),
                Parameter::StartDate { date } => folio::AppCommand::SetStartDate(date),
                Parameter::RiskFreeRate { rate } => folio::AppCommand::SetRiskFreeRate(rate),
            },
            Commands::Analyze { points } => folio::AppCommand::Analyze { points },
            Commands::Report { points } => folio::AppCommand::Report { points },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => folio::cli::setup::setup(),
        Some(cmd) => folio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
