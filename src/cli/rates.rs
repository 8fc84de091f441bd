use super::ui;
use crate::core::amount::CurrencyFormat;
use crate::core::config::AppConfig;
use crate::core::{RateMode, RateProvider, RateSnapshot};
use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, Table};

/// Builds the rates table: the active rate first, then every mode.
pub fn rates_table(snapshot: &RateSnapshot, active: RateMode, format: &CurrencyFormat) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Rate"), ui::header_cell("VES per USD")]);

    table.add_row(vec![
        Cell::new(format!("Active ({active})")).add_attribute(Attribute::Bold),
        ui::format_optional_cell(snapshot.rate_for(active), |r| format.format(r))
            .add_attribute(Attribute::Bold),
    ]);
    for mode in RateMode::ALL {
        table.add_row(vec![
            Cell::new(mode.to_string()),
            ui::format_optional_cell(snapshot.rate_for(mode), |r| format.format(r)),
        ]);
    }
    table
}

/// Lines shown under the rates table.
pub fn footer(snapshot: &RateSnapshot, source_url: &str) -> String {
    let mut output = format!(
        "{} {}",
        ui::style_text("Last updated:", ui::StyleType::Label),
        ui::format_timestamp(&snapshot.last_updated)
    );
    if snapshot.rate_for(RateMode::Official).is_none() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text("Official rate is unavailable.", ui::StyleType::Warning)
        ));
    }
    output.push_str(&format!(
        "\n{}",
        ui::style_text(&format!("Rates source: {source_url}"), ui::StyleType::Subtle)
    ));
    output
}

pub async fn run(provider: &dyn RateProvider, config: &AppConfig) -> Result<()> {
    let pb = ui::new_spinner("Loading exchange rates...");
    let result = provider.fetch_rates().await;
    pb.finish_and_clear();
    let snapshot = result.context("Failed to load exchange rates")?;

    println!(
        "{}\n",
        ui::style_text("Dollar exchange rates", ui::StyleType::Title)
    );
    println!("{}", rates_table(&snapshot, config.mode, &config.display));
    println!("\n{}", footer(&snapshot, config.source_url()));
    Ok(())
}
