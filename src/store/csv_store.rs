//! Ledger and classification tables stored as CSV files.
use crate::core::config::LedgerConfig;
use crate::core::ledger::{
    ClassificationEntry, ClassificationTables, LedgerStore, RiskEntry, Transaction,
    TransactionType,
};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

// Headers also accept the Portuguese column names of older ledgers.
#[derive(Debug, Deserialize)]
struct TransactionRow {
    #[serde(alias = "nome")]
    name: String,
    #[serde(alias = "tipo_transacao")]
    transaction_type: String,
    #[serde(alias = "valor")]
    amount: String,
    #[serde(alias = "data")]
    date: String,
}

#[derive(Debug, Deserialize)]
struct TypeRow {
    #[serde(alias = "nome")]
    name: String,
    #[serde(alias = "tipo_de_investimento")]
    investment_type: String,
}

#[derive(Debug, Deserialize)]
struct RiskRow {
    #[serde(alias = "tipo_de_investimento")]
    investment_type: String,
    #[serde(alias = "risco")]
    risk_tier: String,
}

/// Reads the ledger and both classification tables from CSV files.
///
/// Every fetch re-reads the files, and a malformed row fails the whole read
/// so callers never see a partial ledger.
#[derive(Debug, Clone)]
pub struct CsvStore {
    transactions_path: PathBuf,
    types_path: PathBuf,
    risks_path: PathBuf,
    delimiter: u8,
}

impl CsvStore {
    pub fn new(
        transactions_path: impl Into<PathBuf>,
        types_path: impl Into<PathBuf>,
        risks_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transactions_path: transactions_path.into(),
            types_path: types_path.into(),
            risks_path: risks_path.into(),
            delimiter: b',',
        }
    }

    /// Builds a store from config, resolving relative paths against `base_dir`.
    pub fn from_config(config: &LedgerConfig, base_dir: &Path) -> Result<Self> {
        let store = Self::new(
            base_dir.join(&config.transactions),
            base_dir.join(&config.investment_types),
            base_dir.join(&config.risk_tiers),
        );
        match config.delimiter {
            Some(c) if c.is_ascii() => Ok(store.with_delimiter(c as u8)),
            Some(c) => Err(anyhow!("CSV delimiter must be an ASCII character, got {c:?}")),
            None => Ok(store),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn read_rows<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<(usize, T)>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let headers: StringRecord = reader
            .headers()
            .with_context(|| format!("Failed to read CSV headers: {}", path.display()))?
            .clone();
        debug!("CSV headers for {}: {:?}", path.display(), headers);

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // Header is line 1
            let line = idx + 2;
            let record = result
                .with_context(|| format!("Failed to read {} line {line}", path.display()))?;
            let row: T = record
                .deserialize(Some(&headers))
                .with_context(|| format!("Invalid row in {} line {line}", path.display()))?;
            rows.push((line, row));
        }
        Ok(rows)
    }

    fn hash_files(paths: &[&Path]) -> Result<String> {
        let mut hasher = Sha256::new();
        for path in paths {
            let contents = fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            hasher.update(&contents);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn parse_transaction(row: TransactionRow, seq: u64) -> Result<Transaction> {
    let transaction_type = TransactionType::from_str(&row.transaction_type)?;
    let amount = Decimal::from_str(&row.amount)
        .with_context(|| format!("Invalid amount: {:?}", row.amount))?;
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {:?}", row.date))?;

    Ok(Transaction {
        investment_name: row.name,
        transaction_type,
        amount,
        date,
        seq,
    })
}

impl LedgerStore for CsvStore {
    fn fetch_all_transactions(&self) -> Result<Vec<Transaction>> {
        let path = &self.transactions_path;
        let rows: Vec<(usize, TransactionRow)> = self.read_rows(path)?;

        let transactions = rows
            .into_iter()
            .enumerate()
            .map(|(seq, (line, row))| {
                parse_transaction(row, seq as u64)
                    .with_context(|| format!("Invalid row in {} line {line}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Loaded {} transactions from {}",
            transactions.len(),
            path.display()
        );
        Ok(transactions)
    }

    fn snapshot_version(&self) -> Result<Option<String>> {
        Self::hash_files(&[self.transactions_path.as_path()]).map(Some)
    }
}

impl ClassificationTables for CsvStore {
    fn fetch_type_map(&self) -> Result<Vec<ClassificationEntry>> {
        let rows: Vec<(usize, TypeRow)> = self.read_rows(&self.types_path)?;
        Ok(rows
            .into_iter()
            .map(|(_, row)| ClassificationEntry {
                investment_name: row.name,
                investment_type: row.investment_type,
            })
            .collect())
    }

    fn fetch_risk_map(&self) -> Result<Vec<RiskEntry>> {
        let rows: Vec<(usize, RiskRow)> = self.read_rows(&self.risks_path)?;
        Ok(rows
            .into_iter()
            .map(|(_, row)| RiskEntry {
                investment_type: row.investment_type,
                risk_tier: row.risk_tier,
            })
            .collect())
    }

    fn snapshot_version(&self) -> Result<Option<String>> {
        Self::hash_files(&[self.types_path.as_path(), self.risks_path.as_path()]).map(Some)
    }
}
