//! Portfolio-level balance aggregations over a ledger snapshot.
use crate::core::classify::Classifier;
use crate::core::error::AnalyticsError;
use crate::core::ledger::Transaction;
use crate::core::util::{checked_sum, cmp_nulls_last, percent_of, round2};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Which balance snapshots take part in the aggregations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceSnapshots {
    /// Every `Balance` record is summed, including older monthly snapshots.
    #[default]
    All,
    /// Only the most recent snapshot of each investment is summed.
    Latest,
}

/// Summed balance of one group (an investment type or a risk tier).
/// `label` is `None` for records the classification tables do not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceGroup {
    pub label: Option<String>,
    pub total: Decimal,
    pub count: usize,
}

impl BalanceGroup {
    /// Percentage of `portfolio_total` held by this group.
    pub fn share_of(&self, portfolio_total: Decimal) -> Option<Decimal> {
        percent_of(self.total, portfolio_total).map(round2)
    }
}

/// Latest balance snapshot per investment name, ties broken by `seq`.
pub(crate) fn latest_balances(transactions: &[Transaction]) -> HashMap<&str, &Transaction> {
    let mut latest: HashMap<&str, &Transaction> = HashMap::new();
    for tx in transactions.iter().filter(|t| t.is_balance()) {
        latest
            .entry(tx.investment_name.as_str())
            .and_modify(|current| {
                if tx.supersedes(*current) {
                    *current = tx;
                }
            })
            .or_insert(tx);
    }
    latest
}

fn balance_records(transactions: &[Transaction], mode: BalanceSnapshots) -> Vec<&Transaction> {
    match mode {
        BalanceSnapshots::All => transactions.iter().filter(|t| t.is_balance()).collect(),
        BalanceSnapshots::Latest => {
            let mut records: Vec<&Transaction> =
                latest_balances(transactions).into_values().collect();
            records.sort_by_key(|t| t.seq);
            records
        }
    }
}

/// Sum of the balance snapshots, or `None` if the ledger holds none.
pub fn total_balance(
    transactions: &[Transaction],
    mode: BalanceSnapshots,
) -> Result<Option<Decimal>, AnalyticsError> {
    let records = balance_records(transactions, mode);
    if records.is_empty() {
        return Ok(None);
    }
    checked_sum(records.iter().map(|t| t.amount))
        .map(Some)
        .ok_or_else(|| AnalyticsError::Overflow("total balance".to_string()))
}

/// Balance grouped by investment type. Unclassified investments form a group
/// with no label.
pub fn balance_by_type(
    transactions: &[Transaction],
    classifier: &Classifier,
    mode: BalanceSnapshots,
) -> Result<Vec<BalanceGroup>, AnalyticsError> {
    group_balances(balance_records(transactions, mode), |tx| {
        classifier.investment_type(&tx.investment_name)
    })
}

/// Balance grouped by risk tier, joined through the investment type.
pub fn balance_by_risk(
    transactions: &[Transaction],
    classifier: &Classifier,
    mode: BalanceSnapshots,
) -> Result<Vec<BalanceGroup>, AnalyticsError> {
    group_balances(balance_records(transactions, mode), |tx| {
        classifier.risk_tier(&tx.investment_name)
    })
}

fn group_balances<'c, F>(
    records: Vec<&Transaction>,
    label_of: F,
) -> Result<Vec<BalanceGroup>, AnalyticsError>
where
    F: Fn(&Transaction) -> Option<&'c str>,
{
    let mut groups: HashMap<Option<&'c str>, (Decimal, usize)> = HashMap::new();
    for tx in records {
        let label = label_of(tx);
        let group = groups.entry(label).or_insert((Decimal::ZERO, 0));
        group.0 = group.0.checked_add(tx.amount).ok_or_else(|| {
            AnalyticsError::Overflow(format!(
                "balance of group {}",
                label.unwrap_or("unclassified")
            ))
        })?;
        group.1 += 1;
    }
    debug!("Grouped balances into {} groups", groups.len());

    let mut result: Vec<BalanceGroup> = groups
        .into_iter()
        .map(|(label, (total, count))| BalanceGroup {
            label: label.map(str::to_string),
            total: round2(total),
            count,
        })
        .collect();

    result.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| cmp_nulls_last(a.label.as_deref(), b.label.as_deref()))
    });
    Ok(result)
}
