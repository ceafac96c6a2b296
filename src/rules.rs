//! Per-portfolio investment rule set.
//!
//! A rule set is pure data: numeric and boolean thresholds governing position
//! sizing, cash reserves, pacing, cooldowns and warning sensitivity. It is
//! created lazily with the documented defaults the first time a portfolio is
//! evaluated, and updated wholesale by user edits.
//!
//! Conventions: percentages are expressed 0-100, currency amounts are >= 0.

use serde::{Deserialize, Serialize};

/// Investment rules for a single portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Ceiling on a single symbol's share of portfolio value (%)
    pub max_position_size_pct: f64,
    /// Absolute ceiling on a single symbol's value
    pub max_position_amount: f64,
    /// Daily investment pacing ceiling
    pub max_daily_investment: f64,
    /// Monthly investment pacing ceiling
    pub max_monthly_investment: f64,
    /// Floor on cash-to-total-balance ratio (%)
    pub min_cash_reserve_pct: f64,
    /// Ceiling on the aggregate risk score (1-10)
    pub max_portfolio_risk: u8,
    /// Ceiling on a single sector's share of portfolio value (%)
    pub max_sector_concentration_pct: f64,
    /// Soft confirmation threshold, enforced by the caller
    pub require_confirmation_above: f64,
    /// Minimum wait between trades on the same symbol (hours)
    pub cooldown_period_hours: u32,
    /// Consecutive realized losses before the loss guard warns
    pub max_consecutive_losses: u32,
    /// Advisory stop-loss flag (not auto-executed)
    pub auto_stop_loss: bool,
    /// Stop-loss threshold (%)
    pub stop_loss_pct: f64,
    /// Advisory take-profit flag (not auto-executed)
    pub auto_take_profit: bool,
    /// Take-profit threshold (%)
    pub take_profit_pct: f64,
    /// Whether advisory warnings are generated at all
    pub enable_warnings: bool,
    /// Loss percentage at which a position draws a warning (%)
    pub warning_threshold_pct: f64,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            max_position_size_pct: 20.0,
            max_position_amount: 1_000_000.0,
            max_daily_investment: 500_000.0,
            max_monthly_investment: 2_000_000.0,
            min_cash_reserve_pct: 10.0,
            max_portfolio_risk: 6,
            max_sector_concentration_pct: 40.0,
            require_confirmation_above: 300_000.0,
            cooldown_period_hours: 24,
            max_consecutive_losses: 3,
            auto_stop_loss: false,
            stop_loss_pct: 10.0,
            auto_take_profit: false,
            take_profit_pct: 20.0,
            enable_warnings: true,
            warning_threshold_pct: 15.0,
        }
    }
}

impl RuleSet {
    /// Clamp every field into its documented range.
    ///
    /// User edits arrive from forms and imports; out-of-range values are
    /// corrected here rather than rejected, so an evaluation always has a
    /// usable rule set.
    pub fn normalized(mut self) -> Self {
        self.max_position_size_pct = self.max_position_size_pct.clamp(0.0, 100.0);
        self.min_cash_reserve_pct = self.min_cash_reserve_pct.clamp(0.0, 100.0);
        self.max_sector_concentration_pct = self.max_sector_concentration_pct.clamp(0.0, 100.0);
        self.stop_loss_pct = self.stop_loss_pct.clamp(0.0, 100.0);
        self.take_profit_pct = self.take_profit_pct.clamp(0.0, 100.0);
        self.warning_threshold_pct = self.warning_threshold_pct.clamp(0.0, 100.0);
        self.max_position_amount = self.max_position_amount.max(0.0);
        self.max_daily_investment = self.max_daily_investment.max(0.0);
        self.max_monthly_investment = self.max_monthly_investment.max(0.0);
        self.require_confirmation_above = self.require_confirmation_above.max(0.0);
        self.max_portfolio_risk = self.max_portfolio_risk.clamp(1, 10);
        self
    }

    /// Apply a partial edit, then normalize.
    pub fn apply(mut self, patch: RuleSetPatch) -> Self {
        if let Some(v) = patch.max_position_size_pct {
            self.max_position_size_pct = v;
        }
        if let Some(v) = patch.max_position_amount {
            self.max_position_amount = v;
        }
        if let Some(v) = patch.max_daily_investment {
            self.max_daily_investment = v;
        }
        if let Some(v) = patch.max_monthly_investment {
            self.max_monthly_investment = v;
        }
        if let Some(v) = patch.min_cash_reserve_pct {
            self.min_cash_reserve_pct = v;
        }
        if let Some(v) = patch.max_portfolio_risk {
            self.max_portfolio_risk = v;
        }
        if let Some(v) = patch.max_sector_concentration_pct {
            self.max_sector_concentration_pct = v;
        }
        if let Some(v) = patch.require_confirmation_above {
            self.require_confirmation_above = v;
        }
        if let Some(v) = patch.cooldown_period_hours {
            self.cooldown_period_hours = v;
        }
        if let Some(v) = patch.max_consecutive_losses {
            self.max_consecutive_losses = v;
        }
        if let Some(v) = patch.auto_stop_loss {
            self.auto_stop_loss = v;
        }
        if let Some(v) = patch.stop_loss_pct {
            self.stop_loss_pct = v;
        }
        if let Some(v) = patch.auto_take_profit {
            self.auto_take_profit = v;
        }
        if let Some(v) = patch.take_profit_pct {
            self.take_profit_pct = v;
        }
        if let Some(v) = patch.enable_warnings {
            self.enable_warnings = v;
        }
        if let Some(v) = patch.warning_threshold_pct {
            self.warning_threshold_pct = v;
        }
        self.normalized()
    }
}

/// Partial rule-set edit; `None` fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetPatch {
    pub max_position_size_pct: Option<f64>,
    pub max_position_amount: Option<f64>,
    pub max_daily_investment: Option<f64>,
    pub max_monthly_investment: Option<f64>,
    pub min_cash_reserve_pct: Option<f64>,
    pub max_portfolio_risk: Option<u8>,
    pub max_sector_concentration_pct: Option<f64>,
    pub require_confirmation_above: Option<f64>,
    pub cooldown_period_hours: Option<u32>,
    pub max_consecutive_losses: Option<u32>,
    pub auto_stop_loss: Option<bool>,
    pub stop_loss_pct: Option<f64>,
    pub auto_take_profit: Option<bool>,
    pub take_profit_pct: Option<f64>,
    pub enable_warnings: Option<bool>,
    pub warning_threshold_pct: Option<f64>,
}
