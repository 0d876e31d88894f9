//! Per-investment holding period, net return and annualized growth rate.
//!
//! The annualization nets every contribution and withdrawal instead of
//! weighting them by date: the growth rate is the constant yearly rate that
//! turns the total contributed into the latest balance over the time elapsed
//! since the first contribution.
use crate::core::aggregation::latest_balances;
use crate::core::classify::Classifier;
use crate::core::ledger::{Transaction, TransactionType};
use crate::core::util::{percent_of, round2};
use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;

/// Days per year used to turn a holding period into years.
const DAYS_PER_YEAR: Decimal = Decimal::from_parts(36525, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotComputableReason {
    ZeroContributions,
    ZeroHoldingPeriod,
    NegativeHoldingPeriod,
    NegativeGrowthBase,
    Overflow,
}

impl Display for NotComputableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                NotComputableReason::ZeroContributions => "no contributions",
                NotComputableReason::ZeroHoldingPeriod => "zero holding period",
                NotComputableReason::NegativeHoldingPeriod => "balance precedes first contribution",
                NotComputableReason::NegativeGrowthBase => "negative growth base",
                NotComputableReason::Overflow => "numeric overflow",
            }
        )
    }
}

/// A metric that may be undefined for a given investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Computed {
    Value(Decimal),
    NotComputable(NotComputableReason),
}

impl Computed {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Computed::Value(v) => Some(*v),
            Computed::NotComputable(_) => None,
        }
    }

    pub fn is_computable(&self) -> bool {
        matches!(self, Computed::Value(_))
    }
}

/// Serialized as the plain value, or `null` when not computable.
impl Serialize for Computed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Computed::Value(v) => Serialize::serialize(v, serializer),
            Computed::NotComputable(_) => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentReturn {
    pub name: String,
    pub investment_type: Option<String>,
    pub risk_tier: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub holding_years: Decimal,
    pub total_contributions: Decimal,
    pub total_withdrawals: Decimal,
    pub current_balance: Decimal,
    pub net_return: Decimal,
    pub return_percent: Computed,
    pub annualized_return_percent: Computed,
}

#[derive(Default)]
struct Flows {
    first_contribution: Option<NaiveDate>,
    contributions: Decimal,
    withdrawals: Decimal,
    overflowed: bool,
}

/// Adds `amount` to `total`, saturating and returning `false` on overflow.
fn accumulate(total: &mut Decimal, amount: Decimal) -> bool {
    match total.checked_add(amount) {
        Some(sum) => {
            *total = sum;
            true
        }
        None => {
            *total = total.saturating_add(amount);
            false
        }
    }
}

/// Computes the return table, ordered by annualized return (best first) with
/// not-computable rows last and ties broken by name.
///
/// Investments without both a contribution and a balance snapshot are left out.
pub fn compute_returns(transactions: &[Transaction], classifier: &Classifier) -> Vec<InvestmentReturn> {
    let mut flows: HashMap<&str, Flows> = HashMap::new();
    for tx in transactions {
        let entry = flows.entry(tx.investment_name.as_str()).or_default();
        match tx.transaction_type {
            TransactionType::Contribution => {
                entry.overflowed |= !accumulate(&mut entry.contributions, tx.amount);
                entry.first_contribution = Some(match entry.first_contribution {
                    Some(d) => d.min(tx.date),
                    None => tx.date,
                });
            }
            TransactionType::Withdrawal => {
                entry.overflowed |= !accumulate(&mut entry.withdrawals, tx.amount);
            }
            TransactionType::Balance => {}
        }
    }

    let latest = latest_balances(transactions);
    let mut results = Vec::new();

    for (name, flow) in &flows {
        let (Some(start_date), Some(balance)) = (flow.first_contribution, latest.get(name)) else {
            debug!("Skipping {name}: needs a contribution and a balance snapshot");
            continue;
        };

        let days = (balance.date - start_date).num_days();
        let checked_net = balance
            .amount
            .checked_sub(flow.contributions)
            .and_then(|n| n.checked_add(flow.withdrawals));
        let net_return = checked_net.unwrap_or_else(|| {
            balance
                .amount
                .saturating_sub(flow.contributions)
                .saturating_add(flow.withdrawals)
        });

        let (return_percent, annualized_return_percent) =
            if flow.overflowed || checked_net.is_none() {
                debug!("Flows of {name} overflow the decimal range");
                let overflow = Computed::NotComputable(NotComputableReason::Overflow);
                (overflow, overflow)
            } else {
                (
                    total_return_percent(net_return, flow.contributions),
                    annualized_return(balance.amount, flow.contributions, days),
                )
            };
        if let Computed::NotComputable(reason) = annualized_return_percent {
            debug!("Annualized return for {name} not computable: {reason}");
        }

        results.push(InvestmentReturn {
            name: name.to_string(),
            investment_type: classifier.investment_type(name).map(str::to_string),
            risk_tier: classifier.risk_tier(name).map(str::to_string),
            start_date,
            end_date: balance.date,
            holding_years: round2(Decimal::from(days) / DAYS_PER_YEAR),
            total_contributions: round2(flow.contributions),
            total_withdrawals: round2(flow.withdrawals),
            current_balance: round2(balance.amount),
            net_return: round2(net_return),
            return_percent,
            annualized_return_percent,
        });
    }

    results.sort_by(|a, b| {
        cmp_computed_desc(&a.annualized_return_percent, &b.annualized_return_percent)
            .then_with(|| a.name.cmp(&b.name))
    });
    debug!("Computed returns for {} investments", results.len());
    results
}

/// `net_return / contributions * 100`, rounded to cents.
fn total_return_percent(net_return: Decimal, contributions: Decimal) -> Computed {
    if contributions.is_zero() {
        return Computed::NotComputable(NotComputableReason::ZeroContributions);
    }
    match percent_of(net_return, contributions) {
        Some(pct) => Computed::Value(round2(pct)),
        None => Computed::NotComputable(NotComputableReason::Overflow),
    }
}

/// `((balance / contributions) ^ (1 / years) - 1) * 100`, rounded to cents.
fn annualized_return(balance: Decimal, contributions: Decimal, days: i64) -> Computed {
    use NotComputableReason::*;

    if contributions.is_zero() {
        return Computed::NotComputable(ZeroContributions);
    }
    match days.cmp(&0) {
        Ordering::Equal => return Computed::NotComputable(ZeroHoldingPeriod),
        Ordering::Less => return Computed::NotComputable(NegativeHoldingPeriod),
        Ordering::Greater => {}
    }

    let Some(ratio) = balance.checked_div(contributions) else {
        return Computed::NotComputable(Overflow);
    };
    if ratio < Decimal::ZERO {
        return Computed::NotComputable(NegativeGrowthBase);
    }

    let growth = if ratio.is_zero() {
        Decimal::ZERO
    } else {
        // 1 / years == DAYS_PER_YEAR / days
        let exponent = DAYS_PER_YEAR / Decimal::from(days);
        match ratio.checked_powd(exponent) {
            Some(g) => g,
            // Shrinking below the smallest representable value
            None if ratio < Decimal::ONE => Decimal::ZERO,
            None => return Computed::NotComputable(Overflow),
        }
    };

    match (growth - Decimal::ONE).checked_mul(Decimal::ONE_HUNDRED) {
        Some(pct) => Computed::Value(round2(pct)),
        None => Computed::NotComputable(Overflow),
    }
}

fn cmp_computed_desc(a: &Computed, b: &Computed) -> Ordering {
    match (a.value(), b.value()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
