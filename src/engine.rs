//! Engine facade: wires collaborators together and runs evaluations.
//!
//! All inputs are fetched up front (independent reads run concurrently),
//! then evaluation is pure and synchronous over those snapshots. Calling an
//! evaluation twice over the same snapshots yields the same result; only
//! `record_execution` writes anything, and only to the spend ledger.
//!
//! Snapshots are not re-validated at execution time: if meaningful time
//! passes between evaluation and execution, re-evaluate.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::checklist::builder::{self, ChecklistInput};
use crate::checklist::gate::{self, ExecutionApproval};
use crate::checklist::InvestmentChecklist;
use crate::clock::{Clock, SystemClock};
use crate::error::GateError;
use crate::ledger::{day_window, month_window, LedgerEntry, MemorySpendLedger, SpendLedger};
use crate::portfolio::{CashBalance, ClosedTrade, Portfolio, Position};
use crate::risk::{aggregate, cash, concentration, position, RiskAnalysis};
use crate::rules::RuleSet;
use crate::sector::{SectorClassifier, StaticSectorClassifier};
use crate::store::{
    CashBalanceStore, InMemoryStore, PortfolioStore, PositionStore, RuleSetStore,
    TradeHistoryStore,
};

/// Investment risk and rule evaluation engine.
///
/// Holds read-only collaborators; evaluations never mutate them.
pub struct RiskEngine {
    rules: Arc<dyn RuleSetStore>,
    portfolios: Arc<dyn PortfolioStore>,
    positions: Arc<dyn PositionStore>,
    cash: Arc<dyn CashBalanceStore>,
    ledger: Arc<dyn SpendLedger>,
    history: Option<Arc<dyn TradeHistoryStore>>,
    classifier: Arc<dyn SectorClassifier>,
    clock: Arc<dyn Clock>,
}

impl RiskEngine {
    /// Create an engine over the given collaborators.
    ///
    /// Trade history, sector classification and the clock default to the
    /// bundled implementations; override them with the `with_*` builders.
    pub fn new(
        rules: Arc<dyn RuleSetStore>,
        portfolios: Arc<dyn PortfolioStore>,
        positions: Arc<dyn PositionStore>,
        cash: Arc<dyn CashBalanceStore>,
        ledger: Arc<dyn SpendLedger>,
    ) -> Self {
        Self {
            rules,
            portfolios,
            positions,
            cash,
            ledger,
            history: None,
            classifier: Arc::new(StaticSectorClassifier::default()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Engine backed entirely by in-memory collaborators.
    pub fn in_memory() -> (Self, Arc<InMemoryStore>, Arc<MemorySpendLedger>) {
        let store = Arc::new(InMemoryStore::new());
        let ledger = Arc::new(MemorySpendLedger::new());
        let engine = Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            ledger.clone(),
        );
        (engine, store, ledger)
    }

    /// Enable the realized loss-streak capability.
    pub fn with_trade_history(mut self, history: Arc<dyn TradeHistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// Replace the sector classifier.
    pub fn with_sector_classifier(mut self, classifier: Arc<dyn SectorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ========================================================================
    // Public Operations
    // ========================================================================

    /// Full portfolio risk analysis.
    ///
    /// Errors on an unknown portfolio, since that is an integration fault
    /// rather than a business condition. A missing cash balance degrades to
    /// the fail-safe HIGH posture instead.
    pub async fn analyze_portfolio_risk(&self, portfolio_id: Uuid) -> Result<RiskAnalysis> {
        self.require_portfolio(portfolio_id).await?;

        let (rules, positions, cash_balance) = self.fetch_snapshots(portfolio_id).await?;
        let streaks = self.loss_streaks(portfolio_id, &positions).await?;

        let analysis = self.run_analysis(&rules, &positions, cash_balance.as_ref(), &streaks);
        info!(
            %portfolio_id,
            risk_score = analysis.risk_score,
            warnings = analysis.warnings.len(),
            "Portfolio risk analyzed"
        );
        Ok(analysis)
    }

    /// Evaluate a prospective purchase against the portfolio's rules.
    pub async fn create_investment_checklist(
        &self,
        portfolio_id: Uuid,
        symbol: &str,
        planned_amount: f64,
    ) -> Result<InvestmentChecklist> {
        self.require_portfolio(portfolio_id).await?;

        let (rules, positions, cash_balance) = self.fetch_snapshots(portfolio_id).await?;
        if cash_balance.is_none() {
            warn!(%portfolio_id, "Cash balance unavailable, degrading to fail-safe");
        }

        let now = self.clock.now();
        let (day_from, day_to) = day_window(now);
        let (month_from, month_to) = month_window(now);
        let (daily_spent, monthly_spent) = tokio::try_join!(
            self.ledger.spent_between(portfolio_id, day_from, day_to),
            self.ledger.spent_between(portfolio_id, month_from, month_to),
        )
        .context("failed to read spend ledger")?;

        let loss_streak = match &self.history {
            Some(history) => {
                let trades = history
                    .closed_trades(portfolio_id, symbol)
                    .await
                    .context("failed to read trade history")?;
                Some(consecutive_losses(&trades))
            }
            None => None,
        };

        let streaks = self.loss_streaks(portfolio_id, &positions).await?;
        let analysis = self.run_analysis(&rules, &positions, cash_balance.as_ref(), &streaks);

        let input = ChecklistInput {
            portfolio_id,
            symbol,
            planned_amount,
            rules: &rules,
            positions: &positions,
            cash: cash_balance.as_ref(),
            daily_spent,
            monthly_spent,
            loss_streak,
            portfolio_risk_score: analysis.risk_score,
            now,
        };
        let checklist = builder::build(&input);

        for check in &checklist.checks {
            debug!(
                check = %check.id,
                status = %check.status,
                blocking = check.is_blocking,
                "Checklist item evaluated"
            );
        }
        info!(
            %portfolio_id,
            symbol,
            planned_amount,
            can_proceed = checklist.can_proceed,
            overall_risk = %checklist.overall_risk,
            "Investment checklist evaluated"
        );
        Ok(checklist)
    }

    /// Authorize execution against an evaluated checklist.
    ///
    /// A blocked checklist requires a non-empty override reason; the caller
    /// must persist the returned approval alongside the trade execution.
    pub fn authorize_execution(
        &self,
        checklist: InvestmentChecklist,
        override_reason: Option<&str>,
    ) -> Result<ExecutionApproval, GateError> {
        gate::authorize(checklist, override_reason, self.clock.now())
    }

    /// Record an executed purchase in the spend ledger.
    ///
    /// Call after the surrounding application actually executes the trade;
    /// pacing totals depend on it.
    pub async fn record_execution(
        &self,
        portfolio_id: Uuid,
        symbol: &str,
        amount: f64,
    ) -> Result<()> {
        self.ledger
            .record(LedgerEntry::new(
                portfolio_id,
                symbol,
                amount,
                self.clock.now(),
            ))
            .await
            .context("failed to append to spend ledger")?;
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn require_portfolio(&self, portfolio_id: Uuid) -> Result<Portfolio> {
        self.portfolios
            .get(portfolio_id)
            .await
            .context("failed to load portfolio")?
            .ok_or_else(|| anyhow!("portfolio not found: {portfolio_id}"))
    }

    async fn fetch_snapshots(
        &self,
        portfolio_id: Uuid,
    ) -> Result<(RuleSet, Vec<Position>, Option<CashBalance>)> {
        let (rules, positions, cash_balance) = tokio::try_join!(
            self.rules.get_or_create(portfolio_id),
            self.positions.list_by_portfolio(portfolio_id),
            self.cash.get(portfolio_id),
        )
        .context("failed to load evaluation snapshots")?;
        Ok((rules.normalized(), positions, cash_balance))
    }

    fn run_analysis(
        &self,
        rules: &RuleSet,
        positions: &[Position],
        cash_balance: Option<&CashBalance>,
        streaks: &HashMap<String, u32>,
    ) -> RiskAnalysis {
        let (concentration_risk, mut warnings) =
            concentration::analyze(positions, rules, self.classifier.as_ref());
        let (cash_risk, cash_warnings) = cash::analyze(cash_balance, rules);
        warnings.extend(cash_warnings);
        let (position_risks, position_warnings) = position::analyze(positions, rules, streaks);
        warnings.extend(position_warnings);

        aggregate::combine(
            concentration_risk,
            cash_risk,
            position_risks,
            warnings,
            self.clock.now(),
        )
    }

    async fn loss_streaks(
        &self,
        portfolio_id: Uuid,
        positions: &[Position],
    ) -> Result<HashMap<String, u32>> {
        let mut streaks = HashMap::new();
        let Some(history) = &self.history else {
            return Ok(streaks);
        };
        for symbol in positions.iter().map(|p| p.symbol.as_str()) {
            if streaks.contains_key(symbol) {
                continue;
            }
            let trades = history
                .closed_trades(portfolio_id, symbol)
                .await
                .context("failed to read trade history")?;
            streaks.insert(symbol.to_string(), consecutive_losses(&trades));
        }
        Ok(streaks)
    }
}

/// Count the most recent run of realized losses.
///
/// Expects trades most recent first, as the history store returns them.
fn consecutive_losses(trades: &[ClosedTrade]) -> u32 {
    trades
        .iter()
        .take_while(|t| t.realized_pnl < 0.0)
        .count() as u32
}
