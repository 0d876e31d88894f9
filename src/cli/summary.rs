use super::{OutputFormat, ui};
use crate::core::config::DisplayConfig;
use crate::core::{BalanceGroup, CachedAnalytics, PortfolioOverview};
use anyhow::Result;
use rust_decimal::Decimal;
use tracing::info;

pub fn run(analytics: &CachedAnalytics, display: &DisplayConfig, format: OutputFormat) -> Result<()> {
    info!("Building portfolio summary...");

    let report = analytics.compute_summary()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            println!("{}", render_overview(&report.overview, display));
            ui::print_separator();
            println!(
                "{}",
                render_groups(
                    "Balance by Type",
                    "Type",
                    &report.balance_by_type,
                    report.overview.total_balance,
                    display
                )
            );
            ui::print_separator();
            println!(
                "{}",
                render_groups(
                    "Balance by Risk",
                    "Risk",
                    &report.balance_by_risk,
                    report.overview.total_balance,
                    display
                )
            );
        }
    }
    Ok(())
}

fn render_overview(overview: &PortfolioOverview, display: &DisplayConfig) -> String {
    let total = overview
        .total_balance
        .map_or("N/A".to_string(), |v| ui::format_money(v, display));
    let total_style = if overview.total_balance.is_some() {
        ui::StyleType::TotalValue
    } else {
        ui::StyleType::Error
    };

    format!(
        "{}: {}\n{}: {}\n{}: {}",
        ui::style_text("Total Balance", ui::StyleType::TotalLabel),
        ui::style_text(&total, total_style),
        ui::style_text("Investments", ui::StyleType::TotalLabel),
        overview.investment_count,
        ui::style_text("Accumulated Return", ui::StyleType::TotalLabel),
        ui::format_money(overview.total_net_return, display),
    )
}

fn render_groups(
    title: &str,
    label_header: &str,
    groups: &[BalanceGroup],
    total_balance: Option<Decimal>,
    display: &DisplayConfig,
) -> String {
    let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));
    if groups.is_empty() {
        output.push_str(&ui::style_text("No balance snapshots found.", ui::StyleType::Subtle));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(label_header),
        ui::header_cell("Investments"),
        ui::header_cell("Balance"),
        ui::header_cell("Share (%)"),
    ]);

    for group in groups {
        let share = total_balance.and_then(|t| group.share_of(t));
        table.add_row(vec![
            ui::label_or_unclassified(group.label.as_deref()),
            ui::number_cell(group.count.to_string()),
            ui::number_cell(ui::format_money(group.total, display)),
            ui::format_optional_cell(share, |s| ui::format_percent(s, display)),
        ]);
    }
    output.push_str(&table.to_string());
    output
}
