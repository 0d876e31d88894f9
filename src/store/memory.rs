use crate::core::ledger::{
    ClassificationEntry, ClassificationTables, LedgerStore, RiskEntry, Transaction,
    TransactionType,
};
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

/// In-memory ledger and classification tables.
///
/// Records get their `seq` in push order. Every mutation bumps a revision
/// counter which doubles as the snapshot version.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    transactions: Vec<Transaction>,
    types: Vec<ClassificationEntry>,
    risks: Vec<RiskEntry>,
    revision: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transaction and returns its sequence number.
    pub fn push(
        &mut self,
        investment_name: impl Into<String>,
        transaction_type: TransactionType,
        amount: Decimal,
        date: NaiveDate,
    ) -> u64 {
        let seq = self.transactions.len() as u64;
        self.transactions.push(Transaction {
            investment_name: investment_name.into(),
            transaction_type,
            amount,
            date,
            seq,
        });
        self.revision += 1;
        seq
    }

    pub fn add_type(&mut self, investment_name: impl Into<String>, investment_type: impl Into<String>) {
        self.types.push(ClassificationEntry {
            investment_name: investment_name.into(),
            investment_type: investment_type.into(),
        });
        self.revision += 1;
    }

    pub fn add_risk(&mut self, investment_type: impl Into<String>, risk_tier: impl Into<String>) {
        self.risks.push(RiskEntry {
            investment_type: investment_type.into(),
            risk_tier: risk_tier.into(),
        });
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    fn version(&self) -> String {
        format!("memory-{}", self.revision)
    }
}

impl LedgerStore for MemoryStore {
    fn fetch_all_transactions(&self) -> Result<Vec<Transaction>> {
        debug!("Reading {} transactions from memory", self.transactions.len());
        Ok(self.transactions.clone())
    }

    fn snapshot_version(&self) -> Result<Option<String>> {
        Ok(Some(self.version()))
    }
}

impl ClassificationTables for MemoryStore {
    fn fetch_type_map(&self) -> Result<Vec<ClassificationEntry>> {
        Ok(self.types.clone())
    }

    fn fetch_risk_map(&self) -> Result<Vec<RiskEntry>> {
        Ok(self.risks.clone())
    }

    fn snapshot_version(&self) -> Result<Option<String>> {
        Ok(Some(self.version()))
    }
}
