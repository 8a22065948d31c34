use super::ui;
use crate::core::{HoldingId, Session, SessionConfig};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

/// Renders the current holdings and analysis parameters.
pub fn display_session(session: &Session) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Current Holdings", ui::StyleType::Title)
    );

    if session.holdings().is_empty() {
        output.push_str(&ui::style_text(
            "No holdings yet. Add one with `folio add <TICKER> <QUANTITY>`.",
            ui::StyleType::Subtle,
        ));
    } else {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("ID"),
            ui::header_cell("Ticker"),
            ui::header_cell("Quantity"),
        ]);
        for holding in session.holdings() {
            table.add_row(vec![
                Cell::new(holding.id),
                Cell::new(&holding.ticker),
                ui::value_cell(holding.quantity.to_string()),
            ]);
        }
        output.push_str(&table.to_string());
    }

    output.push_str("\n\n");
    output.push_str(&display_parameters(session.config()));
    output
}

pub fn display_parameters(config: &SessionConfig) -> String {
    format!(
        "{} {}\n{} {}\n{} {} ({})",
        ui::style_text("Benchmark:", ui::StyleType::Label),
        config.benchmark,
        ui::style_text("Start date:", ui::StyleType::Label),
        config.start_date,
        ui::style_text("Risk-free rate:", ui::StyleType::Label),
        config.risk_free_rate,
        ui::format_percent(config.risk_free_rate),
    )
}

pub async fn add(session: &mut Session, ticker: &str, quantity: &str) -> Result<()> {
    let id = session.add_holding(ticker, quantity).await?;
    if let Some(holding) = session.holdings().iter().find(|h| h.id == id) {
        println!(
            "Added {} x {} (id {})",
            ui::style_text(&holding.ticker, ui::StyleType::Value),
            holding.quantity,
            id
        );
    }
    Ok(())
}

pub async fn remove(session: &mut Session, id: u64) -> Result<()> {
    if session.remove_holding(HoldingId(id)).await {
        println!("Removed holding {id}");
    } else {
        println!(
            "{}",
            ui::style_text(&format!("No holding with id {id}"), ui::StyleType::Subtle)
        );
    }
    Ok(())
}

pub async fn set_benchmark(session: &mut Session, symbol: &str) -> Result<()> {
    session.set_benchmark(symbol).await;
    println!("{}", display_parameters(session.config()));
    Ok(())
}

pub async fn set_start_date(session: &mut Session, date: NaiveDate) -> Result<()> {
    session.set_start_date(date).await;
    println!("{}", display_parameters(session.config()));
    Ok(())
}

pub async fn set_risk_free_rate(session: &mut Session, rate: f64) -> Result<()> {
    session.set_risk_free_rate(rate).await?;
    println!("{}", display_parameters(session.config()));
    Ok(())
}
