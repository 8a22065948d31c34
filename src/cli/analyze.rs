use super::ui;
use crate::core::analysis::{AnalysisResult, Metrics};
use crate::core::controller::{self, AnalysisController, Phase};
use crate::core::{KeyValueStore, Session};
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use tracing::debug;

pub const DEFAULT_CHART_POINTS: usize = 12;

impl AnalysisResult {
    /// Renders portfolio and benchmark metrics side by side, followed by a
    /// sampled view of the normalized value series.
    pub fn display_as_table(&self, benchmark: &str, max_points: usize) -> String {
        let mut metrics = ui::new_styled_table();
        metrics.set_header(vec![
            ui::header_cell("Metric"),
            ui::header_cell("Your Portfolio"),
            ui::header_cell(&format!("Benchmark ({benchmark})")),
        ]);

        let rows: [(&str, fn(&Metrics) -> Cell); 4] = [
            ("CAGR", |m| ui::change_cell(m.cagr)),
            ("Annual Volatility", |m| {
                ui::value_cell(ui::format_percent(m.annual_volatility))
            }),
            ("Sharpe Ratio", |m| {
                ui::value_cell(ui::format_number(m.sharpe_ratio))
            }),
            ("Max Drawdown", |m| ui::change_cell(m.max_drawdown)),
        ];
        for (label, cell) in rows {
            metrics.add_row(vec![
                Cell::new(label),
                cell(&self.portfolio),
                cell(&self.benchmark),
            ]);
        }

        let mut output = format!(
            "{}\n\n{}",
            ui::style_text("Analysis Results", ui::StyleType::Title),
            metrics
        );

        let indices = ui::sample_indices(self.chart_series.len(), max_points);
        if !indices.is_empty() {
            let mut chart = ui::new_styled_table();
            chart.set_header(vec![
                ui::header_cell("Date"),
                ui::header_cell("Your Portfolio"),
                ui::header_cell(benchmark),
            ]);
            for index in indices {
                let point = &self.chart_series[index];
                chart.add_row(vec![
                    Cell::new(&point.date),
                    ui::value_cell(ui::format_number(point.portfolio_value)),
                    ui::value_cell(ui::format_number(point.benchmark_value)),
                ]);
            }
            output.push_str(&format!(
                "\n\n{}\n\n{}",
                ui::style_text("Cumulative Returns (Normalized)", ui::StyleType::Title),
                chart
            ));
        }

        output
    }
}

/// Runs an analysis for the session, showing a spinner while it loads.
pub async fn run(
    session: &Session,
    controller: &AnalysisController,
    max_points: usize,
) -> Result<()> {
    let snapshot = session.snapshot();
    let mut states = controller.subscribe();
    let pb = ui::new_spinner("Analyzing portfolio...");

    let (outcome, _) = tokio::join!(controller.run_analysis(&snapshot), async {
        while states.changed().await.is_ok() {
            let phase = states.borrow_and_update().phase;
            debug!(?phase, "Analysis state changed");
            if phase != Phase::Loading {
                break;
            }
        }
    });
    pb.finish_and_clear();

    match outcome {
        Ok(result) => {
            println!(
                "{}",
                result.display_as_table(&session.config().benchmark, max_points)
            );
            Ok(())
        }
        Err(_) => {
            let state = controller.state();
            let message = state
                .error
                .unwrap_or_else(|| "Analysis failed".to_string());
            Err(anyhow!(message))
        }
    }
}

/// Shows the result saved by the last successful analysis.
pub async fn report(session: &Session, store: &dyn KeyValueStore, max_points: usize) -> Result<()> {
    match controller::last_saved_result(store).await? {
        Some(result) => println!(
            "{}",
            result.display_as_table(&session.config().benchmark, max_points)
        ),
        None => println!(
            "{}",
            ui::style_text(
                "No saved analysis yet. Run `folio analyze` first.",
                ui::StyleType::Subtle
            )
        ),
    }
    Ok(())
}
