//! Per-position risk scoring.
//!
//! Pure function: one 1-10 score per open position, derived from unrealized
//! return and recorded rule violations. Loss streaks come from the optional
//! trade-history capability; without it the field stays at zero.

use std::collections::HashMap;

use crate::portfolio::Position;
use crate::rules::RuleSet;

use super::{PositionRisk, RiskLevel, RiskWarning};

/// Base score before adjustments.
const BASE_SCORE: i32 = 5;

/// Unrealized return below which a position is considered deeply underwater.
const DEEP_LOSS_PCT: f64 = -20.0;

/// Score each open position.
///
/// `loss_streaks` maps symbol -> consecutive realized losses; pass an empty
/// map when no trade history capability is wired in.
pub fn analyze(
    positions: &[Position],
    rules: &RuleSet,
    loss_streaks: &HashMap<String, u32>,
) -> (Vec<PositionRisk>, Vec<RiskWarning>) {
    let mut risks = Vec::with_capacity(positions.len());
    let mut warnings = Vec::new();

    for position in positions {
        let current_return_pct = position.unrealized_return_pct();

        let mut violations = Vec::new();
        if position.value() > rules.max_position_amount {
            violations.push(format!(
                "position value {:.0} exceeds max_position_amount {:.0}",
                position.value(),
                rules.max_position_amount
            ));
        }

        let mut score = BASE_SCORE;
        if current_return_pct < -rules.stop_loss_pct {
            score += 2;
        }
        if current_return_pct < DEEP_LOSS_PCT {
            score += 2;
        }
        if !violations.is_empty() {
            score += 1;
        }
        let risk_score = score.clamp(1, 10) as u8;

        if rules.enable_warnings && current_return_pct < -rules.warning_threshold_pct {
            warnings.push(RiskWarning {
                id: format!("position-loss-{}", position.symbol),
                severity: RiskLevel::Medium,
                category: "포지션".to_string(),
                title: "평가 손실 경고".to_string(),
                message: format!(
                    "{} 평가 손실 {:.1}%가 경고 기준 -{:.0}%를 넘었습니다",
                    position.symbol, current_return_pct, rules.warning_threshold_pct
                ),
                recommendation: Some("손절 기준과 보유 근거를 재점검하세요".to_string()),
                can_proceed: true,
            });
        }

        risks.push(PositionRisk {
            symbol: position.symbol.clone(),
            current_return_pct,
            risk_score,
            consecutive_losses: loss_streaks.get(&position.symbol).copied().unwrap_or(0),
            last_trade_date: position.trade_date,
            violations,
        });
    }

    (risks, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

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
    fn test_healthy_position_scores_base() {
        let positions = vec![make_test_position("AAPL", 10.0, 100.0, 110.0)];
        let (risks, warnings) = analyze(&positions, &RuleSet::default(), &HashMap::new());

        assert_eq!(risks[0].risk_score, 5);
        assert!(risks[0].violations.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_stop_loss_breach_adds_two() {
        // -12% return vs default 10% stop loss
        let positions = vec![make_test_position("AAPL", 10.0, 100.0, 88.0)];
        let (risks, _) = analyze(&positions, &RuleSet::default(), &HashMap::new());
        assert_eq!(risks[0].risk_score, 7);
    }

    #[test]
    fn test_deep_loss_adds_four() {
        // -25% return: past the stop loss and past -20%
        let positions = vec![make_test_position("AAPL", 10.0, 100.0, 75.0)];
        let (risks, warnings) = analyze(&positions, &RuleSet::default(), &HashMap::new());
        assert_eq!(risks[0].risk_score, 9);
        // Also past the 15% warning threshold
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].id, "position-loss-AAPL");
    }

    #[test]
    fn test_amount_violation_adds_one() {
        // Value 1,200,000 exceeds the 1,000,000 default cap
        let positions = vec![make_test_position("BIG", 100.0, 12_000.0, 12_000.0)];
        let (risks, _) = analyze(&positions, &RuleSet::default(), &HashMap::new());
        assert_eq!(risks[0].risk_score, 6);
        assert_eq!(risks[0].violations.len(), 1);
        assert!(risks[0].violations[0].contains("max_position_amount"));
    }

    #[test]
    fn test_score_clamped_to_ten() {
        let mut rules = RuleSet::default();
        rules.stop_loss_pct = 1.0;
        // -90% return and an amount violation: 5 + 2 + 2 + 1 = 10
        let positions = vec![make_test_position("WRECK", 1000.0, 10_000.0, 1_000.0)];
        let (risks, _) = analyze(&positions, &rules, &HashMap::new());
        assert_eq!(risks[0].risk_score, 10);
    }

    #[test]
    fn test_loss_streak_carried_through() {
        let positions = vec![make_test_position("AAPL", 10.0, 100.0, 110.0)];
        let mut streaks = HashMap::new();
        streaks.insert("AAPL".to_string(), 4);

        let (risks, _) = analyze(&positions, &RuleSet::default(), &streaks);
        assert_eq!(risks[0].consecutive_losses, 4);
    }

    #[test]
    fn test_warnings_suppressed_when_disabled() {
        let mut rules = RuleSet::default();
        rules.enable_warnings = false;
        let positions = vec![make_test_position("AAPL", 10.0, 100.0, 75.0)];
        let (_, warnings) = analyze(&positions, &rules, &HashMap::new());
        assert!(warnings.is_empty());
    }
}
