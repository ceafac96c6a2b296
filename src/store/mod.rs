//! Collaborator store abstractions.
//!
//! The engine never reaches into ambient state: rule sets, portfolios,
//! positions, cash balances and trade history all arrive through these
//! traits, injected at construction. The surrounding application binds them
//! to its own persistence; `InMemoryStore` is the bundled implementation for
//! tests and stand-alone use.

pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::portfolio::{CashBalance, ClosedTrade, Portfolio, Position};
use crate::rules::{RuleSet, RuleSetPatch};

/// Per-portfolio rule sets, created lazily with defaults.
#[async_trait]
pub trait RuleSetStore: Send + Sync {
    /// Fetch the portfolio's rule set, creating it with defaults if absent.
    async fn get_or_create(&self, portfolio_id: Uuid) -> Result<RuleSet, StoreError>;

    /// Apply a partial edit and return the stored result.
    async fn update(
        &self,
        portfolio_id: Uuid,
        patch: RuleSetPatch,
    ) -> Result<RuleSet, StoreError>;
}

/// Portfolio records.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Fetch a portfolio by id; `None` when it does not exist.
    async fn get(&self, portfolio_id: Uuid) -> Result<Option<Portfolio>, StoreError>;
}

/// Open positions.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// List all open positions in a portfolio.
    async fn list_by_portfolio(&self, portfolio_id: Uuid) -> Result<Vec<Position>, StoreError>;
}

/// Cash balance snapshots computed upstream.
#[async_trait]
pub trait CashBalanceStore: Send + Sync {
    /// Fetch the cash snapshot; `None` means unavailable and the engine
    /// degrades to its fail-safe posture.
    async fn get(&self, portfolio_id: Uuid) -> Result<Option<CashBalance>, StoreError>;
}

/// Realized trade history, backing the loss-streak capability. Optional:
/// engines without it report zero streaks.
#[async_trait]
pub trait TradeHistoryStore: Send + Sync {
    /// Closed trades for a symbol, most recent first.
    async fn closed_trades(
        &self,
        portfolio_id: Uuid,
        symbol: &str,
    ) -> Result<Vec<ClosedTrade>, StoreError>;
}
