use super::{OutputFormat, ui};
use crate::core::config::DisplayConfig;
use crate::core::{CachedAnalytics, Computed, InvestmentReturn};
use anyhow::Result;
use comfy_table::Cell;
use tracing::info;

pub fn run(analytics: &CachedAnalytics, display: &DisplayConfig, format: OutputFormat) -> Result<()> {
    info!("Calculating returns for investments...");

    let returns = analytics.compute_returns()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&returns)?),
        OutputFormat::Table => {
            if returns.is_empty() {
                println!("No investments with both a contribution and a balance snapshot.");
                return Ok(());
            }
            println!("{}", render_returns(&returns, display));
        }
    }
    Ok(())
}

fn computed_cell(value: Computed, display: &DisplayConfig) -> Cell {
    match value {
        Computed::Value(v) => ui::change_cell(v, display),
        Computed::NotComputable(_) => ui::format_optional_cell(None::<String>, |s| s),
    }
}

fn render_returns(returns: &[InvestmentReturn], display: &DisplayConfig) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Investment"),
        ui::header_cell("Type"),
        ui::header_cell("Risk"),
        ui::header_cell("Years"),
        ui::header_cell("Contributions"),
        ui::header_cell("Balance"),
        ui::header_cell("Return"),
        ui::header_cell("Return (%)"),
        ui::header_cell("Annualized (%)"),
    ]);

    for r in returns {
        table.add_row(vec![
            Cell::new(&r.name),
            ui::label_or_unclassified(r.investment_type.as_deref()),
            ui::label_or_unclassified(r.risk_tier.as_deref()),
            ui::number_cell(ui::format_number(r.holding_years, display)),
            ui::number_cell(ui::format_money(r.total_contributions, display)),
            ui::number_cell(ui::format_money(r.current_balance, display)),
            ui::number_cell(ui::format_money(r.net_return, display)),
            computed_cell(r.return_percent, display),
            computed_cell(r.annualized_return_percent, display),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Investment Performance", ui::StyleType::Title),
        table
    )
}
