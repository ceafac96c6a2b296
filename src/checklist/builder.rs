//! The six pre-purchase checks and their aggregation.
//!
//! Each check is independent and yields PASS / WARNING / FAIL with a blocking
//! flag; only a blocking FAIL prevents proceeding. Check evaluation is pure:
//! every input is part of `ChecklistInput`, fetched by the engine beforehand.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::portfolio::{CashBalance, Position};
use crate::risk::{RiskLevel, RiskWarning};
use crate::rules::RuleSet;

use super::{CheckStatus, ChecklistItem, InvestmentChecklist};

/// Snapshot of everything the six checks need.
#[derive(Debug)]
pub struct ChecklistInput<'a> {
    /// Portfolio being purchased into
    pub portfolio_id: Uuid,
    /// Symbol of the prospective purchase
    pub symbol: &'a str,
    /// Planned purchase amount
    pub planned_amount: f64,
    /// Rule set (already normalized)
    pub rules: &'a RuleSet,
    /// Open positions in the portfolio
    pub positions: &'a [Position],
    /// Cash snapshot; `None` means unavailable (fail-safe)
    pub cash: Option<&'a CashBalance>,
    /// Amount already executed today (spend ledger)
    pub daily_spent: f64,
    /// Amount already executed this month (spend ledger)
    pub monthly_spent: f64,
    /// Consecutive realized losses on the symbol; `None` without trade history
    pub loss_streak: Option<u32>,
    /// Aggregate portfolio risk score (1-10)
    pub portfolio_risk_score: u8,
    /// Evaluation instant
    pub now: DateTime<Utc>,
}

/// Evaluate all six checks and aggregate the verdict.
pub fn build(input: &ChecklistInput) -> InvestmentChecklist {
    let checks = vec![
        check_cash_availability(input),
        check_position_size(input),
        check_investment_pacing(input),
        check_cooldown(input),
        check_consecutive_losses(input),
        check_portfolio_risk(input),
    ];

    let has_blocking_failure = checks.iter().any(|c| c.blocks());
    let warning_count = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Warning)
        .count();

    let can_proceed = !has_blocking_failure;
    let overall_risk = if has_blocking_failure || warning_count > 2 {
        RiskLevel::High
    } else if warning_count >= 1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let mut warnings = Vec::new();
    for check in &checks {
        match check.status {
            // Blocking failures always surface, even with warnings disabled;
            // a blocked verdict must never be silent.
            CheckStatus::Fail => warnings.push(RiskWarning {
                id: format!("check-{}", check.id),
                severity: RiskLevel::High,
                category: check.category.clone(),
                title: check.title.clone(),
                message: check.message.clone(),
                recommendation: check.recommendation.clone(),
                can_proceed: !check.is_blocking,
            }),
            CheckStatus::Warning if input.rules.enable_warnings => {
                warnings.push(RiskWarning {
                    id: format!("check-{}", check.id),
                    severity: RiskLevel::Medium,
                    category: check.category.clone(),
                    title: check.title.clone(),
                    message: check.message.clone(),
                    recommendation: check.recommendation.clone(),
                    can_proceed: true,
                })
            }
            _ => {}
        }
    }

    InvestmentChecklist {
        portfolio_id: input.portfolio_id,
        symbol: input.symbol.to_string(),
        planned_amount: input.planned_amount,
        checks,
        overall_risk,
        can_proceed,
        warnings,
        evaluated_at: input.now,
    }
}

// ============================================================================
// Individual Checks
// ============================================================================

fn item(
    id: &str,
    category: &str,
    title: &str,
    status: CheckStatus,
    message: String,
    recommendation: Option<String>,
    is_blocking: bool,
) -> ChecklistItem {
    ChecklistItem {
        id: id.to_string(),
        category: category.to_string(),
        title: title.to_string(),
        status,
        message,
        recommendation,
        is_blocking,
    }
}

/// Cash availability (현금 가용성). Hard stop: cannot spend cash that does
/// not exist; an unavailable balance is treated the same way.
fn check_cash_availability(input: &ChecklistInput) -> ChecklistItem {
    const ID: &str = "cash-availability";
    const CATEGORY: &str = "현금";
    const TITLE: &str = "현금 가용성";

    let Some(cash) = input.cash else {
        return item(
            ID,
            CATEGORY,
            TITLE,
            CheckStatus::Fail,
            "현금 잔고 정보를 확인할 수 없습니다".to_string(),
            Some("잔고를 동기화한 뒤 다시 시도하세요".to_string()),
            true,
        );
    };

    if input.planned_amount > cash.cash_balance {
        return item(
            ID,
            CATEGORY,
            TITLE,
            CheckStatus::Fail,
            format!(
                "현금 부족: 필요 {:.0}, 보유 {:.0}",
                input.planned_amount, cash.cash_balance
            ),
            Some("매수 금액을 줄이거나 현금을 충전하세요".to_string()),
            true,
        );
    }

    if cash.total_balance > 0.0 {
        let post_ratio =
            (cash.cash_balance - input.planned_amount) / cash.total_balance * 100.0;
        if post_ratio < input.rules.min_cash_reserve_pct {
            return item(
                ID,
                CATEGORY,
                TITLE,
                CheckStatus::Warning,
                format!(
                    "매수 후 현금 비중 {:.1}%가 최소 유보 비율 {:.0}%를 밑돕니다",
                    post_ratio, input.rules.min_cash_reserve_pct
                ),
                Some("매수 금액 조정을 고려하세요".to_string()),
                true,
            );
        }
    }

    item(
        ID,
        CATEGORY,
        TITLE,
        CheckStatus::Pass,
        format!("현금 충분: 보유 {:.0}", cash.cash_balance),
        None,
        true,
    )
}

/// Position size (포지션 크기). The absolute amount cap is a hard rule; the
/// relative share cap is advisory.
fn check_position_size(input: &ChecklistInput) -> ChecklistItem {
    const ID: &str = "position-size";
    const CATEGORY: &str = "한도";
    const TITLE: &str = "포지션 크기";

    let existing_value: f64 = input
        .positions
        .iter()
        .filter(|p| p.symbol == input.symbol)
        .map(|p| p.value())
        .sum();
    let post_value = existing_value + input.planned_amount;

    if post_value > input.rules.max_position_amount {
        return item(
            ID,
            CATEGORY,
            TITLE,
            CheckStatus::Fail,
            format!(
                "종목 보유액 한도 초과: 매수 후 {:.0} > 한도 {:.0}",
                post_value, input.rules.max_position_amount
            ),
            Some("매수 금액을 한도 이내로 줄이세요".to_string()),
            true,
        );
    }

    // Portfolio-share basis: total balance when the cash snapshot is usable,
    // otherwise current position value plus the planned amount.
    let basis = match input.cash {
        Some(c) if c.total_balance > 0.0 => c.total_balance,
        _ => input.positions.iter().map(|p| p.value()).sum::<f64>() + input.planned_amount,
    };
    if basis > 0.0 {
        let post_share = post_value / basis * 100.0;
        if post_share > input.rules.max_position_size_pct {
            return item(
                ID,
                CATEGORY,
                TITLE,
                CheckStatus::Warning,
                format!(
                    "매수 후 {} 비중 {:.1}%가 한도 {:.0}%를 초과합니다",
                    input.symbol, post_share, input.rules.max_position_size_pct
                ),
                Some("분산 투자를 고려하세요".to_string()),
                false,
            );
        }
    }

    item(
        ID,
        CATEGORY,
        TITLE,
        CheckStatus::Pass,
        format!("매수 후 보유액 {:.0}, 한도 이내", post_value),
        None,
        true,
    )
}

/// Investment pacing (투자 한도). Cumulative same-day and same-month spend
/// from the ledger plus the planned amount, against the pacing ceilings.
/// Advisory: pacing never blocks.
fn check_investment_pacing(input: &ChecklistInput) -> ChecklistItem {
    const ID: &str = "investment-pacing";
    const CATEGORY: &str = "한도";
    const TITLE: &str = "투자 한도";

    let mut breaches = Vec::new();
    let daily_total = input.daily_spent + input.planned_amount;
    if daily_total > input.rules.max_daily_investment {
        breaches.push(format!(
            "일일 한도 초과: 오늘 집행 {:.0} + 계획 {:.0} > {:.0}",
            input.daily_spent, input.planned_amount, input.rules.max_daily_investment
        ));
    }
    let monthly_total = input.monthly_spent + input.planned_amount;
    if monthly_total > input.rules.max_monthly_investment {
        breaches.push(format!(
            "월간 한도 초과: 이번 달 집행 {:.0} + 계획 {:.0} > {:.0}",
            input.monthly_spent, input.planned_amount, input.rules.max_monthly_investment
        ));
    }

    if breaches.is_empty() {
        item(
            ID,
            CATEGORY,
            TITLE,
            CheckStatus::Pass,
            format!("오늘 {:.0} / 이번 달 {:.0} 집행, 한도 이내", daily_total, monthly_total),
            None,
            false,
        )
    } else {
        item(
            ID,
            CATEGORY,
            TITLE,
            CheckStatus::Warning,
            breaches.join("; "),
            Some("매수를 나누어 집행하거나 다음 날로 미루세요".to_string()),
            false,
        )
    }
}

/// Cooldown (쿨다운). Discourages rapid re-entry into the same symbol.
fn check_cooldown(input: &ChecklistInput) -> ChecklistItem {
    const ID: &str = "cooldown";
    const CATEGORY: &str = "타이밍";
    const TITLE: &str = "쿨다운";

    let last_trade = input
        .positions
        .iter()
        .filter(|p| p.symbol == input.symbol)
        .map(|p| p.trade_date)
        .max();

    if let Some(last) = last_trade {
        let elapsed_hours = (input.now - last).num_hours();
        let cooldown = input.rules.cooldown_period_hours as i64;
        if elapsed_hours >= 0 && elapsed_hours < cooldown {
            let remaining = cooldown - elapsed_hours;
            return item(
                ID,
                CATEGORY,
                TITLE,
                CheckStatus::Warning,
                format!(
                    "{} 마지막 매수 후 {}시간 경과, {}시간 더 남았습니다",
                    input.symbol, elapsed_hours, remaining
                ),
                Some("쿨다운이 끝난 뒤 재매수를 검토하세요".to_string()),
                false,
            );
        }
    }

    item(
        ID,
        CATEGORY,
        TITLE,
        CheckStatus::Pass,
        "쿨다운 제한 없음".to_string(),
        None,
        false,
    )
}

/// Consecutive losses (연속 손실). Two explicitly named signals: the realized
/// loss streak from trade history when available, and the current-drawdown
/// proxy (unrealized loss beyond the stop-loss threshold) otherwise.
fn check_consecutive_losses(input: &ChecklistInput) -> ChecklistItem {
    const ID: &str = "consecutive-losses";
    const CATEGORY: &str = "손실";
    const TITLE: &str = "연속 손실";

    if let Some(streak) = input.loss_streak {
        if streak >= input.rules.max_consecutive_losses {
            return item(
                ID,
                CATEGORY,
                TITLE,
                CheckStatus::Warning,
                format!(
                    "{} 최근 {}회 연속 실현 손실 (기준 {}회)",
                    input.symbol, streak, input.rules.max_consecutive_losses
                ),
                Some("전략을 재점검한 뒤 진입하세요".to_string()),
                false,
            );
        }
    }

    let drawdown = input
        .positions
        .iter()
        .filter(|p| p.symbol == input.symbol)
        .map(|p| p.unrealized_return_pct())
        .fold(None::<f64>, |acc, r| {
            Some(acc.map_or(r, |a| a.min(r)))
        });
    if let Some(ret) = drawdown {
        if ret < -input.rules.stop_loss_pct {
            return item(
                ID,
                CATEGORY,
                TITLE,
                CheckStatus::Warning,
                format!(
                    "{} 현재 손실률 {:.1}%가 손절 기준 -{:.0}%를 넘었습니다",
                    input.symbol, ret, input.rules.stop_loss_pct
                ),
                Some("물타기 전에 보유 근거를 재검토하세요".to_string()),
                false,
            );
        }
    }

    item(
        ID,
        CATEGORY,
        TITLE,
        CheckStatus::Pass,
        "연속 손실 징후 없음".to_string(),
        None,
        false,
    )
}

/// Portfolio risk ceiling (포트폴리오 위험). Advisory circuit breaker on the
/// aggregate score. An empty portfolio has nothing to break.
fn check_portfolio_risk(input: &ChecklistInput) -> ChecklistItem {
    const ID: &str = "portfolio-risk";
    const CATEGORY: &str = "위험도";
    const TITLE: &str = "포트폴리오 위험";

    if input.positions.is_empty() {
        return item(
            ID,
            CATEGORY,
            TITLE,
            CheckStatus::Pass,
            "보유 포지션 없음".to_string(),
            None,
            false,
        );
    }

    if input.portfolio_risk_score > input.rules.max_portfolio_risk {
        return item(
            ID,
            CATEGORY,
            TITLE,
            CheckStatus::Warning,
            format!(
                "위험 점수 {}/10이 한도 {}를 초과합니다",
                input.portfolio_risk_score, input.rules.max_portfolio_risk
            ),
            Some("신규 매수보다 리밸런싱을 우선 검토하세요".to_string()),
            false,
        );
    }

    item(
        ID,
        CATEGORY,
        TITLE,
        CheckStatus::Pass,
        format!("위험 점수 {}/10, 한도 이내", input.portfolio_risk_score),
        None,
        false,
    )
}

// ============================================================================
// Tests
// ============================================================================
