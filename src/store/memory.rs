//! In-memory implementation of every collaborator store.
//!
//! Used by the integration tests and by embedders that keep portfolio data
//! in their own process. All maps live behind a single async lock; contention
//! is irrelevant at personal-portfolio scale.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::portfolio::{CashBalance, ClosedTrade, Portfolio, Position};
use crate::rules::{RuleSet, RuleSetPatch};

use super::{CashBalanceStore, PortfolioStore, PositionStore, RuleSetStore, TradeHistoryStore};

#[derive(Default)]
struct Inner {
    portfolios: HashMap<Uuid, Portfolio>,
    rules: HashMap<Uuid, RuleSet>,
    positions: HashMap<Uuid, Vec<Position>>,
    cash: HashMap<Uuid, CashBalance>,
    trades: HashMap<Uuid, Vec<ClosedTrade>>,
}

/// In-memory store backing all collaborator traits.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a portfolio
    pub async fn put_portfolio(&self, portfolio: Portfolio) {
        self.inner
            .write()
            .await
            .portfolios
            .insert(portfolio.id, portfolio);
    }

    /// Set a portfolio's cash snapshot
    pub async fn put_cash(&self, portfolio_id: Uuid, cash: CashBalance) {
        self.inner.write().await.cash.insert(portfolio_id, cash);
    }

    /// Remove a portfolio's cash snapshot (simulates an unavailable balance)
    pub async fn clear_cash(&self, portfolio_id: Uuid) {
        self.inner.write().await.cash.remove(&portfolio_id);
    }

    /// Add an open position
    pub async fn put_position(&self, portfolio_id: Uuid, position: Position) {
        self.inner
            .write()
            .await
            .positions
            .entry(portfolio_id)
            .or_default()
            .push(position);
    }

    /// Add a closed trade to the history
    pub async fn put_closed_trade(&self, portfolio_id: Uuid, trade: ClosedTrade) {
        self.inner
            .write()
            .await
            .trades
            .entry(portfolio_id)
            .or_default()
            .push(trade);
    }
}

#[async_trait]
impl RuleSetStore for InMemoryStore {
    async fn get_or_create(&self, portfolio_id: Uuid) -> Result<RuleSet, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .rules
            .entry(portfolio_id)
            .or_insert_with(RuleSet::default)
            .clone())
    }

    async fn update(
        &self,
        portfolio_id: Uuid,
        patch: RuleSetPatch,
    ) -> Result<RuleSet, StoreError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .rules
            .entry(portfolio_id)
            .or_insert_with(RuleSet::default)
            .clone();
        let updated = current.apply(patch);
        inner.rules.insert(portfolio_id, updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl PortfolioStore for InMemoryStore {
    async fn get(&self, portfolio_id: Uuid) -> Result<Option<Portfolio>, StoreError> {
        Ok(self.inner.read().await.portfolios.get(&portfolio_id).cloned())
    }
}

#[async_trait]
impl PositionStore for InMemoryStore {
    async fn list_by_portfolio(&self, portfolio_id: Uuid) -> Result<Vec<Position>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .positions
            .get(&portfolio_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl CashBalanceStore for InMemoryStore {
    async fn get(&self, portfolio_id: Uuid) -> Result<Option<CashBalance>, StoreError> {
        Ok(self.inner.read().await.cash.get(&portfolio_id).cloned())
    }
}

#[async_trait]
impl TradeHistoryStore for InMemoryStore {
    async fn closed_trades(
        &self,
        portfolio_id: Uuid,
        symbol: &str,
    ) -> Result<Vec<ClosedTrade>, StoreError> {
        let mut trades: Vec<ClosedTrade> = self
            .inner
            .read()
            .await
            .trades
            .get(&portfolio_id)
            .map(|all| {
                all.iter()
                    .filter(|t| t.symbol == symbol)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        trades.sort_by(|a, b| b.closed_at.cmp(&a.closed_at));
        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_rule_set_created_lazily_with_defaults() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();

        let rules = store.get_or_create(id).await.unwrap();
        assert_eq!(rules, RuleSet::default());

        // Second fetch returns the same stored rules
        let again = store.get_or_create(id).await.unwrap();
        assert_eq!(rules, again);
    }

    #[tokio::test]
    async fn test_rule_set_patch_persists() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();

        let patch = RuleSetPatch {
            max_daily_investment: Some(100_000.0),
            ..RuleSetPatch::default()
        };
        let updated = store.update(id, patch).await.unwrap();
        assert_eq!(updated.max_daily_investment, 100_000.0);

        let fetched = store.get_or_create(id).await.unwrap();
        assert_eq!(fetched.max_daily_investment, 100_000.0);
    }

    #[tokio::test]
    async fn test_closed_trades_filtered_and_sorted() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        let now = Utc::now();

        for (symbol, pnl, days_ago) in
            [("AAPL", -100.0, 2), ("MSFT", 50.0, 1), ("AAPL", 30.0, 5)]
        {
            store
                .put_closed_trade(
                    id,
                    ClosedTrade {
                        symbol: symbol.to_string(),
                        realized_pnl: pnl,
                        closed_at: now - Duration::days(days_ago),
                    },
                )
                .await;
        }

        let trades = store.closed_trades(id, "AAPL").await.unwrap();
        assert_eq!(trades.len(), 2);
        // Most recent first
        assert_eq!(trades[0].realized_pnl, -100.0);
        assert_eq!(trades[1].realized_pnl, 30.0);
    }

    #[tokio::test]
    async fn test_missing_portfolio_is_none() {
        let store = InMemoryStore::new();
        assert!(PortfolioStore::get(&store, Uuid::new_v4()).await.unwrap().is_none());
    }
}
