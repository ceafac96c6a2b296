//! Append-only spend ledger.
//!
//! Pacing limits are meaningless without a running total: the ledger records
//! every executed purchase amount with its timestamp, and the pacing check
//! sums the current day/month window at evaluation time instead of trusting
//! a single comparison.

pub mod sqlite;

pub use sqlite::{SqliteLedgerConfig, SqliteSpendLedger};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

/// One executed purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry id
    pub id: Uuid,
    /// Portfolio the purchase was executed in
    pub portfolio_id: Uuid,
    /// Purchased symbol
    pub symbol: String,
    /// Executed amount
    pub amount: f64,
    /// Execution timestamp
    pub executed_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create an entry with a fresh id
    pub fn new(
        portfolio_id: Uuid,
        symbol: impl Into<String>,
        amount: f64,
        executed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            portfolio_id,
            symbol: symbol.into(),
            amount,
            executed_at,
        }
    }
}

/// Append-only record of executed purchase amounts.
#[async_trait]
pub trait SpendLedger: Send + Sync {
    /// Append an executed purchase.
    async fn record(&self, entry: LedgerEntry) -> Result<(), StoreError>;

    /// Sum of executed amounts in `[from, to)` for a portfolio.
    async fn spent_between(
        &self,
        portfolio_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<f64, StoreError>;
}

/// `[start, end)` of the UTC day containing `now`.
pub fn day_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// `[start, end)` of the UTC month containing `now`.
pub fn month_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = now.date_naive();
    let start_date = date.with_day(1).unwrap_or(date);
    let end_date = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .unwrap_or(start_date);
    (
        start_date.and_time(NaiveTime::MIN).and_utc(),
        end_date.and_time(NaiveTime::MIN).and_utc(),
    )
}

/// In-memory ledger for tests and stand-alone use.
#[derive(Default)]
pub struct MemorySpendLedger {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl MemorySpendLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpendLedger for MemorySpendLedger {
    async fn record(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn spent_between(
        &self,
        portfolio_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<f64, StoreError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| {
                e.portfolio_id == portfolio_id && e.executed_at >= from && e.executed_at < to
            })
            .map(|e| e.amount)
            .sum())
    }
}
