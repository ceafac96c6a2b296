//! Portfolio risk analysis.
//!
//! Three analyzers (concentration, cash, per-position) each produce a typed
//! risk object plus advisory warnings; the aggregator combines them into one
//! 1-10 score with a severity-ordered, de-duplicated warning list. All of it
//! is pure computation over snapshots, with no I/O and no shared state.

pub mod aggregate;
pub mod cash;
pub mod concentration;
pub mod position;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Risk Levels and Warnings
// ============================================================================

/// Coarse risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Sort rank: most severe first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "높음"),
            Self::Medium => write!(f, "보통"),
            Self::Low => write!(f, "낮음"),
        }
    }
}

/// An advisory risk warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskWarning {
    /// Stable id, used for de-duplication (e.g. "cash-reserve")
    pub id: String,
    /// Severity tier
    pub severity: RiskLevel,
    /// Warning category (e.g. "집중도", "현금")
    pub category: String,
    /// Short title
    pub title: String,
    /// Human-readable detail
    pub message: String,
    /// Suggested action, when one exists
    pub recommendation: Option<String>,
    /// Whether the warned action may still proceed
    pub can_proceed: bool,
}

// ============================================================================
// Analyzer Outputs
// ============================================================================

/// One position's share of the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionShare {
    /// Stock symbol
    pub symbol: String,
    /// Share of total position value (%)
    pub percentage: f64,
    /// Tier relative to the position-size rule
    pub tier: RiskLevel,
}

/// One sector's share of the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorShare {
    /// Sector name
    pub sector: String,
    /// Share of total position value (%)
    pub percentage: f64,
}

/// Concentration posture of the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentrationRisk {
    /// Top positions by share, descending, at most 5
    pub top_positions: Vec<PositionShare>,
    /// Per-sector shares, descending
    pub sector_concentration: Vec<SectorShare>,
    /// 1-10 proxy for spread, based on distinct-symbol count
    pub diversification_score: u8,
}

/// Cash adequacy posture of the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashRisk {
    /// Current cash-to-total ratio (%)
    pub current_cash_ratio_pct: f64,
    /// Recommended minimum cash ratio from the rule set (%)
    pub recommended_cash_ratio_pct: f64,
    /// Invested share of the total balance (%)
    pub utilization_rate_pct: f64,
    /// Cash risk tier
    pub level: RiskLevel,
    /// Linear burn-rate estimate of days until cash runs out
    pub days_until_cash_out: u32,
}

/// Risk posture of one open position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRisk {
    /// Stock symbol
    pub symbol: String,
    /// Unrealized return (%)
    pub current_return_pct: f64,
    /// 1-10 risk score
    pub risk_score: u8,
    /// Consecutive realized losses on this symbol (0 without trade history)
    pub consecutive_losses: u32,
    /// Most recent trade timestamp
    pub last_trade_date: DateTime<Utc>,
    /// Rule violations recorded for this position
    pub violations: Vec<String>,
}

/// Aggregate risk analysis, computed on demand and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// Overall 1-10 risk score
    pub risk_score: u8,
    /// Warnings from all analyzers, most severe first, de-duplicated
    pub warnings: Vec<RiskWarning>,
    /// Free-text suggestions; advisory only, never a decision input
    pub recommendations: Vec<String>,
    /// Concentration breakdown
    pub concentration: ConcentrationRisk,
    /// Cash adequacy breakdown
    pub cash: CashRisk,
    /// Per-position breakdown
    pub positions: Vec<PositionRisk>,
    /// When the analysis ran
    pub analysis_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_rank_ordering() {
        assert!(RiskLevel::High.rank() < RiskLevel::Medium.rank());
        assert!(RiskLevel::Medium.rank() < RiskLevel::Low.rank());
    }

    #[test]
    fn test_risk_level_display() {
        assert_eq!(RiskLevel::High.to_string(), "높음");
        assert_eq!(RiskLevel::Low.to_string(), "낮음");
    }
}
