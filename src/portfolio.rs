//! Portfolio domain records.
//!
//! These are read-only snapshots handed to the engine by its collaborators.
//! The engine never mutates them; the surrounding application owns their
//! lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Portfolio
// ============================================================================

/// A brokerage portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    /// Portfolio id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Portfolio {
    /// Create a portfolio with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Position
// ============================================================================

/// An open stock position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Stock symbol
    pub symbol: String,
    /// Number of shares (>= 0)
    pub quantity: f64,
    /// Average purchase price per share
    pub avg_price: f64,
    /// Current price per share
    pub current_price: f64,
    /// Most recent trade timestamp for this position
    pub trade_date: DateTime<Utc>,
    /// Category label (e.g. "성장주", "배당주")
    pub category: Option<String>,
    /// Strategy tags
    pub strategies: Vec<String>,
}

impl Position {
    /// Current market value.
    pub fn value(&self) -> f64 {
        self.quantity * self.current_price
    }

    /// Cost basis.
    pub fn cost(&self) -> f64 {
        self.quantity * self.avg_price
    }

    /// Unrealized return percentage; 0 when the average price is unusable.
    pub fn unrealized_return_pct(&self) -> f64 {
        if self.avg_price > 0.0 {
            (self.current_price - self.avg_price) / self.avg_price * 100.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// Cash Balance
// ============================================================================

/// Cash snapshot computed upstream from the portfolio's total balance and
/// open positions. Invariant `cash_balance = total_balance - invested_amount`
/// is trusted, not re-enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashBalance {
    /// Total account balance
    pub total_balance: f64,
    /// Uninvested cash
    pub cash_balance: f64,
    /// Amount currently invested
    pub invested_amount: f64,
}

impl CashBalance {
    /// Invested share of the total balance (%).
    pub fn utilization_rate_pct(&self) -> f64 {
        if self.total_balance > 0.0 {
            self.invested_amount / self.total_balance * 100.0
        } else {
            0.0
        }
    }

    /// Cash share of the total balance (%).
    pub fn cash_ratio_pct(&self) -> f64 {
        if self.total_balance > 0.0 {
            self.cash_balance / self.total_balance * 100.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// Closed Trades
// ============================================================================

/// A realized (closed) trade, used for loss-streak tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    /// Stock symbol
    pub symbol: String,
    /// Realized profit or loss
    pub realized_pnl: f64,
    /// When the trade was closed
    pub closed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_position(symbol: &str, qty: f64, avg: f64, current: f64) -> Position {
        Position {
            symbol: symbol.to_string(),
            quantity: qty,
            avg_price: avg,
            current_price: current,
            trade_date: Utc::now(),
            category: None,
            strategies: Vec::new(),
        }
    }

    #[test]
    fn test_position_derived_values() {
        let position = make_test_position("AAPL", 10.0, 100.0, 120.0);
        assert!((position.value() - 1200.0).abs() < 0.01);
        assert!((position.cost() - 1000.0).abs() < 0.01);
        assert!((position.unrealized_return_pct() - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_position_zero_avg_price_guard() {
        let position = make_test_position("NEW", 10.0, 0.0, 50.0);
        assert_eq!(position.unrealized_return_pct(), 0.0);
    }

    #[test]
    fn test_cash_balance_ratios() {
        let cash = CashBalance {
            total_balance: 1_000_000.0,
            cash_balance: 400_000.0,
            invested_amount: 600_000.0,
        };
        assert!((cash.cash_ratio_pct() - 40.0).abs() < 0.01);
        assert!((cash.utilization_rate_pct() - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_cash_balance_zero_total_guard() {
        let cash = CashBalance {
            total_balance: 0.0,
            cash_balance: 0.0,
            invested_amount: 0.0,
        };
        assert_eq!(cash.cash_ratio_pct(), 0.0);
        assert_eq!(cash.utilization_rate_pct(), 0.0);
    }
}
