//! Presentation layer: renders analytics results as tables or JSON

pub mod returns;
pub mod setup;
pub mod summary;
pub mod ui;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
