//! Entry point for every portfolio computation over injected data sources.
use crate::core::aggregation::{self, BalanceGroup, BalanceSnapshots};
use crate::core::classify::Classifier;
use crate::core::error::AnalyticsError;
use crate::core::ledger::{ClassificationTables, LedgerStore, Transaction};
use crate::core::returns::{self, InvestmentReturn};
use crate::core::util::checked_sum;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

/// Headline figures for the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioOverview {
    pub total_balance: Option<Decimal>,
    /// Investments with enough data to appear in the return table.
    pub investment_count: usize,
    pub total_net_return: Decimal,
}

/// Overview and both balance breakdowns, all from one ledger snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub overview: PortfolioOverview,
    pub balance_by_type: Vec<BalanceGroup>,
    pub balance_by_risk: Vec<BalanceGroup>,
}

/// Computes summaries from a ledger store and classification tables.
///
/// Each call reads a fresh snapshot from the sources, so results always reflect
/// the current ledger. Wrap it in `CachedAnalytics` to reuse results while the
/// sources report an unchanged snapshot version.
pub struct Analytics<'a> {
    ledger: &'a dyn LedgerStore,
    tables: &'a dyn ClassificationTables,
    snapshots: BalanceSnapshots,
}

impl<'a> Analytics<'a> {
    pub fn new(
        ledger: &'a dyn LedgerStore,
        tables: &'a dyn ClassificationTables,
        snapshots: BalanceSnapshots,
    ) -> Self {
        Self {
            ledger,
            tables,
            snapshots,
        }
    }

    pub fn ledger(&self) -> &'a dyn LedgerStore {
        self.ledger
    }

    pub fn tables(&self) -> &'a dyn ClassificationTables {
        self.tables
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>, AnalyticsError> {
        let transactions = self
            .ledger
            .fetch_all_transactions()
            .map_err(AnalyticsError::ledger)?;
        debug!("Loaded {} transactions", transactions.len());
        Ok(transactions)
    }

    fn load_classifier(&self) -> Result<Classifier, AnalyticsError> {
        let types = self
            .tables
            .fetch_type_map()
            .map_err(AnalyticsError::classification)?;
        let risks = self
            .tables
            .fetch_risk_map()
            .map_err(AnalyticsError::classification)?;
        debug!(
            "Loaded {} type entries and {} risk entries",
            types.len(),
            risks.len()
        );
        Ok(Classifier::new(&types, &risks))
    }

    pub fn compute_total_balance(&self) -> Result<Option<Decimal>, AnalyticsError> {
        let transactions = self.load_transactions()?;
        aggregation::total_balance(&transactions, self.snapshots)
    }

    pub fn compute_balance_by_type(&self) -> Result<Vec<BalanceGroup>, AnalyticsError> {
        let transactions = self.load_transactions()?;
        let classifier = self.load_classifier()?;
        aggregation::balance_by_type(&transactions, &classifier, self.snapshots)
    }

    pub fn compute_balance_by_risk(&self) -> Result<Vec<BalanceGroup>, AnalyticsError> {
        let transactions = self.load_transactions()?;
        let classifier = self.load_classifier()?;
        aggregation::balance_by_risk(&transactions, &classifier, self.snapshots)
    }

    pub fn compute_returns(&self) -> Result<Vec<InvestmentReturn>, AnalyticsError> {
        let transactions = self.load_transactions()?;
        let classifier = self.load_classifier()?;
        Ok(returns::compute_returns(&transactions, &classifier))
    }

    pub fn compute_overview(&self) -> Result<PortfolioOverview, AnalyticsError> {
        let transactions = self.load_transactions()?;
        let classifier = self.load_classifier()?;
        self.overview_of(&transactions, &classifier)
    }

    /// Overview plus balance by type and by risk over a single read of the
    /// sources, so the group shares add up to the reported total.
    pub fn compute_summary(&self) -> Result<PortfolioSummary, AnalyticsError> {
        let transactions = self.load_transactions()?;
        let classifier = self.load_classifier()?;
        Ok(PortfolioSummary {
            overview: self.overview_of(&transactions, &classifier)?,
            balance_by_type: aggregation::balance_by_type(
                &transactions,
                &classifier,
                self.snapshots,
            )?,
            balance_by_risk: aggregation::balance_by_risk(
                &transactions,
                &classifier,
                self.snapshots,
            )?,
        })
    }

    fn overview_of(
        &self,
        transactions: &[Transaction],
        classifier: &Classifier,
    ) -> Result<PortfolioOverview, AnalyticsError> {
        let returns = returns::compute_returns(transactions, classifier);
        let total_net_return = checked_sum(returns.iter().map(|r| r.net_return))
            .ok_or_else(|| AnalyticsError::Overflow("accumulated net return".to_string()))?;

        let overview = PortfolioOverview {
            total_balance: aggregation::total_balance(transactions, self.snapshots)?,
            investment_count: returns.len(),
            total_net_return,
        };
        info!(
            investments = overview.investment_count,
            "Computed portfolio overview"
        );
        Ok(overview)
    }
}
