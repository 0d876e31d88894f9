//! Core business logic: ledger model, aggregations and return calculations

pub mod aggregation;
pub mod analytics;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod ledger;
pub mod log;
pub mod returns;
pub mod util;

// Re-export main types for cleaner imports
pub use aggregation::{BalanceGroup, BalanceSnapshots};
pub use analytics::{Analytics, PortfolioOverview, PortfolioSummary};
pub use cache::CachedAnalytics;
pub use error::AnalyticsError;
pub use ledger::{
    ClassificationEntry, ClassificationTables, LedgerStore, RiskEntry, Transaction,
    TransactionType,
};
pub use returns::{Computed, InvestmentReturn, NotComputableReason};
