use crate::core::config::DisplayConfig;
use crate::core::util::round2;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use rust_decimal::Decimal;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Right-aligned cell for a plain value.
pub fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a cell for a percentage with color coding by sign.
pub fn change_cell(change: Decimal, display: &DisplayConfig) -> Cell {
    let text = format_percent(change, display);
    let color = if change.is_sign_negative() && !change.is_zero() {
        Color::Red
    } else {
        Color::Green
    };
    Cell::new(text)
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Label for groups the classification tables do not cover.
pub fn label_or_unclassified(label: Option<&str>) -> Cell {
    match label {
        Some(l) => Cell::new(l),
        None => Cell::new("Unclassified").fg(Color::DarkGrey),
    }
}

/// Formats a number with two decimals and the configured separators,
/// e.g. `1.234,56`.
pub fn format_number(value: Decimal, display: &DisplayConfig) -> String {
    let rounded = round2(value);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    let text = format!("{rounded:.2}");
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(display.thousands_separator);
        }
        grouped.push(c);
    }

    format!("{sign}{grouped}{}{frac_part}", display.decimal_separator)
}

/// Formats money as `<symbol> <number>`, e.g. `R$ 1.234,56`.
pub fn format_money(value: Decimal, display: &DisplayConfig) -> String {
    format!("{} {}", display.currency_symbol, format_number(value, display))
}

pub fn format_percent(value: Decimal, display: &DisplayConfig) -> String {
    format!("{}%", format_number(value, display))
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
