//! Failures that abort a whole analytics request

use thiserror::Error;

/// Whole-batch failures. Per-record problems never surface here; they are
/// reported inline as `Computed::NotComputable` or by leaving the record out.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("ledger store unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("classification tables unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("decimal overflow computing {0}")]
    Overflow(String),
}

impl AnalyticsError {
    pub(crate) fn ledger(err: anyhow::Error) -> Self {
        AnalyticsError::LedgerUnavailable(format!("{err:#}"))
    }

    pub(crate) fn classification(err: anyhow::Error) -> Self {
        AnalyticsError::ClassificationUnavailable(format!("{err:#}"))
    }
}
