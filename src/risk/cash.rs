//! Cash adequacy analysis.
//!
//! An unavailable cash balance is treated as maximally risky: the engine
//! would rather report HIGH than guess. The days-until-cash-out figure is a
//! linear burn-rate estimate from the daily pacing ceiling, not a forecast
//! from actual trade history.

use crate::portfolio::CashBalance;
use crate::rules::RuleSet;

use super::{CashRisk, RiskLevel, RiskWarning};

/// Daily burn assumed when no daily pacing ceiling is configured.
const FALLBACK_DAILY_BURN: f64 = 100_000.0;

/// Cash ratio multiple below which cash risk is MEDIUM.
const RESERVE_COMFORT_FACTOR: f64 = 1.5;

/// Analyze cash adequacy against the reserve rule.
pub fn analyze(balance: Option<&CashBalance>, rules: &RuleSet) -> (CashRisk, Vec<RiskWarning>) {
    let Some(balance) = balance else {
        let mut warnings = Vec::new();
        if rules.enable_warnings {
            warnings.push(RiskWarning {
                id: "cash-missing".to_string(),
                severity: RiskLevel::High,
                category: "현금".to_string(),
                title: "현금 정보 없음".to_string(),
                message: "현금 잔고를 확인할 수 없어 최대 위험으로 간주합니다".to_string(),
                recommendation: Some("잔고를 동기화한 뒤 다시 평가하세요".to_string()),
                can_proceed: false,
            });
        }
        return (
            CashRisk {
                current_cash_ratio_pct: 0.0,
                recommended_cash_ratio_pct: rules.min_cash_reserve_pct,
                utilization_rate_pct: 0.0,
                level: RiskLevel::High,
                days_until_cash_out: 0,
            },
            warnings,
        );
    };

    let ratio = balance.cash_ratio_pct();
    let level = if ratio < rules.min_cash_reserve_pct {
        RiskLevel::High
    } else if ratio < RESERVE_COMFORT_FACTOR * rules.min_cash_reserve_pct {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let daily_rate = if rules.max_daily_investment > 0.0 {
        rules.max_daily_investment
    } else {
        FALLBACK_DAILY_BURN
    };
    let days_until_cash_out = (balance.cash_balance.max(0.0) / daily_rate).floor() as u32;

    let mut warnings = Vec::new();
    if rules.enable_warnings && level != RiskLevel::Low {
        warnings.push(RiskWarning {
            id: "cash-reserve".to_string(),
            severity: level,
            category: "현금".to_string(),
            title: "현금 유보 부족".to_string(),
            message: format!(
                "현금 비중 {:.1}%가 권장 최소치 {:.0}%{} 수준입니다",
                ratio,
                rules.min_cash_reserve_pct,
                if level == RiskLevel::High {
                    " 아래"
                } else {
                    " 부근"
                }
            ),
            recommendation: Some("신규 매수 전에 현금 확보를 고려하세요".to_string()),
            can_proceed: true,
        });
    }

    (
        CashRisk {
            current_cash_ratio_pct: ratio,
            recommended_cash_ratio_pct: rules.min_cash_reserve_pct,
            utilization_rate_pct: balance.utilization_rate_pct(),
            level,
            days_until_cash_out,
        },
        warnings,
    )
}
