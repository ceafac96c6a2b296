//! SQLite-backed spend ledger.
//!
//! Entries survive restarts so pacing totals stay honest across sessions.
//! Timestamps are stored as RFC 3339 UTC text, which compares correctly as
//! strings in range queries.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;

use super::{LedgerEntry, SpendLedger};

const CREATE_TABLES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS spend_ledger (
    id TEXT PRIMARY KEY,
    portfolio_id TEXT NOT NULL,
    symbol TEXT NOT NULL,
    amount REAL NOT NULL,
    executed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_spend_ledger_portfolio_time
ON spend_ledger(portfolio_id, executed_at);
"#;

/// Configuration for the SQLite ledger.
#[derive(Debug, Clone)]
pub struct SqliteLedgerConfig {
    /// Path to the SQLite database
    pub db_path: PathBuf,
}

impl Default for SqliteLedgerConfig {
    fn default() -> Self {
        Self {
            db_path: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".invest-guard")
                .join("ledger.db"),
        }
    }
}

/// Persistent append-only spend ledger.
pub struct SqliteSpendLedger {
    // Mutex rather than RwLock: rusqlite::Connection is Send but not Sync
    db: Arc<Mutex<Connection>>,
}

impl SqliteSpendLedger {
    /// Open (or create) the ledger database.
    pub fn new(config: SqliteLedgerConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Internal(format!("create ledger dir: {e}")))?;
        }

        let conn = Connection::open(&config.db_path)?;
        conn.execute_batch(CREATE_TABLES_SQL)?;
        debug!(path = %config.db_path.display(), "Spend ledger opened");

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLES_SQL)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl SpendLedger for SqliteSpendLedger {
    async fn record(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO spend_ledger (id, portfolio_id, symbol, amount, executed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id.to_string(),
                entry.portfolio_id.to_string(),
                entry.symbol,
                entry.amount,
                entry.executed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn spent_between(
        &self,
        portfolio_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<f64, StoreError> {
        let db = self.db.lock().await;
        let spent: f64 = db.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM spend_ledger
             WHERE portfolio_id = ?1 AND executed_at >= ?2 AND executed_at < ?3",
            params![
                portfolio_id.to_string(),
                from.to_rfc3339(),
                to.to_rfc3339()
            ],
            |row| row.get(0),
        )?;
        Ok(spent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::day_window;
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_record_and_sum() {
        let ledger = SqliteSpendLedger::open_in_memory().unwrap();
        let portfolio = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();

        ledger
            .record(LedgerEntry::new(portfolio, "AAPL", 120_000.0, now))
            .await
            .unwrap();
        ledger
            .record(LedgerEntry::new(
                portfolio,
                "MSFT",
                80_000.0,
                now + Duration::hours(2),
            ))
            .await
            .unwrap();
        ledger
            .record(LedgerEntry::new(
                portfolio,
                "AAPL",
                500_000.0,
                now - Duration::days(3),
            ))
            .await
            .unwrap();

        let (from, to) = day_window(now);
        let spent = ledger.spent_between(portfolio, from, to).await.unwrap();
        assert!((spent - 200_000.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_empty_window_sums_to_zero() {
        let ledger = SqliteSpendLedger::open_in_memory().unwrap();
        let (from, to) = day_window(Utc::now());
        let spent = ledger
            .spent_between(Uuid::new_v4(), from, to)
            .await
            .unwrap();
        assert_eq!(spent, 0.0);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = SqliteLedgerConfig {
            db_path: dir.path().join("ledger.db"),
        };
        let portfolio = Uuid::new_v4();
        let now = Utc::now();

        {
            let ledger = SqliteSpendLedger::new(config.clone()).unwrap();
            ledger
                .record(LedgerEntry::new(portfolio, "AAPL", 42_000.0, now))
                .await
                .unwrap();
        }

        let ledger = SqliteSpendLedger::new(config).unwrap();
        let (from, to) = day_window(now);
        let spent = ledger.spent_between(portfolio, from, to).await.unwrap();
        assert!((spent - 42_000.0).abs() < 0.01);
    }
}
