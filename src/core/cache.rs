use crate::core::aggregation::BalanceGroup;
use crate::core::analytics::{Analytics, PortfolioOverview, PortfolioSummary};
use crate::core::error::AnalyticsError;
use crate::core::returns::InvestmentReturn;
use rust_decimal::Decimal;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Results computed for one snapshot version.
struct Reports {
    version: String,
    total_balance: Option<Option<Decimal>>,
    balance_by_type: Option<Vec<BalanceGroup>>,
    balance_by_risk: Option<Vec<BalanceGroup>>,
    returns: Option<Vec<InvestmentReturn>>,
    overview: Option<PortfolioOverview>,
    summary: Option<PortfolioSummary>,
}

impl Reports {
    fn new(version: String) -> Self {
        Self {
            version,
            total_balance: None,
            balance_by_type: None,
            balance_by_risk: None,
            returns: None,
            overview: None,
            summary: None,
        }
    }
}

/// Memoizes `Analytics` results per ledger snapshot version.
///
/// A cached result is served only while both sources report the version it
/// was computed from. Sources that report no version are never cached.
pub struct CachedAnalytics<'a> {
    analytics: Analytics<'a>,
    reports: Mutex<Option<Reports>>,
}

impl<'a> CachedAnalytics<'a> {
    pub fn new(analytics: Analytics<'a>) -> Self {
        Self {
            analytics,
            reports: Mutex::new(None),
        }
    }

    /// Combined version of the ledger and the classification tables.
    fn current_version(&self) -> Result<Option<String>, AnalyticsError> {
        let ledger = self
            .analytics
            .ledger()
            .snapshot_version()
            .map_err(AnalyticsError::ledger)?;
        let tables = self
            .analytics
            .tables()
            .snapshot_version()
            .map_err(AnalyticsError::classification)?;
        Ok(match (ledger, tables) {
            (Some(l), Some(t)) => Some(format!("{l}:{t}")),
            _ => None,
        })
    }

    fn cached<T, S, F>(&self, name: &str, slot: S, compute: F) -> Result<T, AnalyticsError>
    where
        T: Clone,
        S: Fn(&mut Reports) -> &mut Option<T>,
        F: FnOnce(&Analytics<'a>) -> Result<T, AnalyticsError>,
    {
        let Some(version) = self.current_version()? else {
            debug!("Unversioned snapshot, computing {name} without cache");
            return compute(&self.analytics);
        };

        {
            let mut guard = self.reports.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(reports) = guard.as_mut().filter(|r| r.version == version) {
                if let Some(value) = slot(reports) {
                    debug!("Cache HIT for {name}");
                    return Ok(value.clone());
                }
            }
        }

        debug!("Cache MISS for {name}");
        let value = compute(&self.analytics)?;

        // The snapshot may have changed while computing; keep the result only
        // if it still belongs to the version it was looked up under.
        if self.current_version()?.as_ref() != Some(&version) {
            debug!("Snapshot changed while computing {name}, not caching");
            return Ok(value);
        }

        let mut guard = self.reports.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref().is_none_or(|r| r.version != version) {
            debug!("Cache reset for snapshot {version}");
            *guard = Some(Reports::new(version.clone()));
        }
        let reports = guard.get_or_insert_with(|| Reports::new(version));
        *slot(reports) = Some(value.clone());
        Ok(value)
    }

    pub fn compute_total_balance(&self) -> Result<Option<Decimal>, AnalyticsError> {
        self.cached("total balance", |r| &mut r.total_balance, |a| {
            a.compute_total_balance()
        })
    }

    pub fn compute_balance_by_type(&self) -> Result<Vec<BalanceGroup>, AnalyticsError> {
        self.cached("balance by type", |r| &mut r.balance_by_type, |a| {
            a.compute_balance_by_type()
        })
    }

    pub fn compute_balance_by_risk(&self) -> Result<Vec<BalanceGroup>, AnalyticsError> {
        self.cached("balance by risk", |r| &mut r.balance_by_risk, |a| {
            a.compute_balance_by_risk()
        })
    }

    pub fn compute_returns(&self) -> Result<Vec<InvestmentReturn>, AnalyticsError> {
        self.cached("returns", |r| &mut r.returns, |a| a.compute_returns())
    }

    pub fn compute_overview(&self) -> Result<PortfolioOverview, AnalyticsError> {
        self.cached("overview", |r| &mut r.overview, |a| a.compute_overview())
    }

    pub fn compute_summary(&self) -> Result<PortfolioSummary, AnalyticsError> {
        self.cached("summary", |r| &mut r.summary, |a| a.compute_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregation::BalanceSnapshots;
    use crate::core::ledger::{
        ClassificationEntry, ClassificationTables, LedgerStore, RiskEntry, Transaction,
        TransactionType,
    };
    use crate::store::memory::MemoryStore;
    use anyhow::Result;
    use chrono::NaiveDate;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts ledger reads so tests can tell cache hits from recomputations.
    struct CountingStore {
        inner: RwLock<MemoryStore>,
        fetches: AtomicUsize,
        versioned: bool,
    }

    impl CountingStore {
        fn new(versioned: bool) -> Self {
            let mut store = MemoryStore::new();
            store.push(
                "CDB",
                TransactionType::Balance,
                Decimal::from(100),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            );
            Self {
                inner: RwLock::new(store),
                fetches: AtomicUsize::new(0),
                versioned,
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl LedgerStore for CountingStore {
        fn fetch_all_transactions(&self) -> Result<Vec<Transaction>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.read().unwrap().fetch_all_transactions()
        }

        fn snapshot_version(&self) -> Result<Option<String>> {
            if self.versioned {
                LedgerStore::snapshot_version(&*self.inner.read().unwrap())
            } else {
                Ok(None)
            }
        }
    }

    impl ClassificationTables for CountingStore {
        fn fetch_type_map(&self) -> Result<Vec<ClassificationEntry>> {
            self.inner.read().unwrap().fetch_type_map()
        }

        fn fetch_risk_map(&self) -> Result<Vec<RiskEntry>> {
            self.inner.read().unwrap().fetch_risk_map()
        }

        fn snapshot_version(&self) -> Result<Option<String>> {
            if self.versioned {
                ClassificationTables::snapshot_version(&*self.inner.read().unwrap())
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn test_cache_hit_for_unchanged_snapshot() {
        let store = CountingStore::new(true);
        let cached = CachedAnalytics::new(Analytics::new(&store, &store, BalanceSnapshots::All));

        assert_eq!(cached.compute_total_balance().unwrap(), Some(Decimal::from(100)));
        assert_eq!(cached.compute_total_balance().unwrap(), Some(Decimal::from(100)));
        assert_eq!(store.fetches(), 1);

        // Each report has its own slot
        cached.compute_balance_by_type().unwrap();
        cached.compute_balance_by_type().unwrap();
        assert_eq!(store.fetches(), 2);
    }

    #[test]
    fn test_cache_invalidated_when_ledger_changes() {
        let store = CountingStore::new(true);
        let cached = CachedAnalytics::new(Analytics::new(&store, &store, BalanceSnapshots::All));

        assert_eq!(cached.compute_total_balance().unwrap(), Some(Decimal::from(100)));

        store.inner.write().unwrap().push(
            "LCI",
            TransactionType::Balance,
            Decimal::from(50),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );

        assert_eq!(cached.compute_total_balance().unwrap(), Some(Decimal::from(150)));
        assert_eq!(store.fetches(), 2);
    }

    #[test]
    fn test_summary_reads_ledger_once() {
        let store = CountingStore::new(true);
        let cached = CachedAnalytics::new(Analytics::new(&store, &store, BalanceSnapshots::All));

        let summary = cached.compute_summary().unwrap();
        assert_eq!(summary.overview.total_balance, Some(Decimal::from(100)));
        assert_eq!(summary.balance_by_type.len(), 1);
        assert_eq!(store.fetches(), 1);

        cached.compute_summary().unwrap();
        assert_eq!(store.fetches(), 1);
    }

    #[test]
    fn test_unversioned_sources_are_never_cached() {
        let store = CountingStore::new(false);
        let cached = CachedAnalytics::new(Analytics::new(&store, &store, BalanceSnapshots::All));

        cached.compute_returns().unwrap();
        cached.compute_returns().unwrap();
        assert_eq!(store.fetches(), 2);
    }
}
