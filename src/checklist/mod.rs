//! Pre-purchase checklist types.
//!
//! A checklist is the engine's primary output: six named checks evaluated
//! against a prospective purchase, aggregated into a pass/warn/fail verdict
//! with a blocking decision. It is computed fresh for every prospective
//! purchase and never persisted. It is purely a decision artifact.

pub mod builder;
pub mod gate;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::risk::{RiskLevel, RiskWarning};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "통과"),
            Self::Warning => write!(f, "경고"),
            Self::Fail => write!(f, "실패"),
        }
    }
}

/// One named, independently evaluated risk check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Stable check id (e.g. "cash-availability")
    pub id: String,
    /// Check category (e.g. "현금", "한도")
    pub category: String,
    /// Short title
    pub title: String,
    /// Outcome
    pub status: CheckStatus,
    /// Human-readable detail
    pub message: String,
    /// Suggested action, when one exists
    pub recommendation: Option<String>,
    /// Whether a FAIL on this check alone blocks execution
    pub is_blocking: bool,
}

impl ChecklistItem {
    /// True when this item alone prevents proceeding.
    pub fn blocks(&self) -> bool {
        self.status == CheckStatus::Fail && self.is_blocking
    }
}

/// The aggregated verdict for a prospective purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentChecklist {
    /// Portfolio being purchased into
    pub portfolio_id: Uuid,
    /// Symbol of the prospective purchase
    pub symbol: String,
    /// Planned purchase amount
    pub planned_amount: f64,
    /// The individual checks, in evaluation order
    pub checks: Vec<ChecklistItem>,
    /// Overall risk tier for this purchase
    pub overall_risk: RiskLevel,
    /// Whether execution may proceed without an override
    pub can_proceed: bool,
    /// Warnings derived from non-passing checks
    pub warnings: Vec<RiskWarning>,
    /// When the checklist was evaluated
    pub evaluated_at: DateTime<Utc>,
}

impl InvestmentChecklist {
    /// Titles of the checks that block execution.
    pub fn blocking_failures(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| c.blocks())
            .map(|c| c.title.clone())
            .collect()
    }

    /// Count of WARNING-status checks.
    pub fn warning_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Warning)
            .count()
    }
}
