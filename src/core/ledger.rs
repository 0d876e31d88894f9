//! Ledger records and the collaborator traits that provide them

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Contribution,
    Withdrawal,
    Balance,
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransactionType::Contribution => "Contribution",
                TransactionType::Withdrawal => "Withdrawal",
                TransactionType::Balance => "Balance",
            }
        )
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    /// Accepts the English names and the Portuguese labels used by older ledgers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contribution" | "aporte" => Ok(TransactionType::Contribution),
            "withdrawal" | "resgate" => Ok(TransactionType::Withdrawal),
            "balance" | "saldo" => Ok(TransactionType::Balance),
            _ => Err(anyhow!("Invalid transaction type: {}", s)),
        }
    }
}

/// A single ledger entry.
///
/// `seq` is the position of the record in the store's read order. It breaks
/// ties between balance snapshots that share a date: the higher `seq` wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub investment_name: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub seq: u64,
}

impl Transaction {
    pub fn is_balance(&self) -> bool {
        self.transaction_type == TransactionType::Balance
    }

    /// True if `self` is a more recent snapshot than `other`.
    pub fn supersedes(&self, other: &Transaction) -> bool {
        (self.date, self.seq) > (other.date, other.seq)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub investment_name: String,
    pub investment_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    pub investment_type: String,
    pub risk_tier: String,
}

/// Read-only source of ledger transactions.
pub trait LedgerStore: Send + Sync {
    /// Returns every transaction as one consistent snapshot.
    fn fetch_all_transactions(&self) -> Result<Vec<Transaction>>;

    /// Opaque stamp identifying the current contents. `None` means the
    /// store cannot tell, and results computed from it must not be cached.
    fn snapshot_version(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Lookup tables joining investments to their type and types to a risk tier.
pub trait ClassificationTables: Send + Sync {
    fn fetch_type_map(&self) -> Result<Vec<ClassificationEntry>>;

    fn fetch_risk_map(&self) -> Result<Vec<RiskEntry>>;

    fn snapshot_version(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
