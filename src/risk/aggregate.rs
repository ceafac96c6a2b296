//! Risk aggregation: one overall score plus a prioritized warning list.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::{
    CashRisk, ConcentrationRisk, PositionRisk, RiskAnalysis, RiskLevel, RiskWarning,
};

/// Per-position score at or above which a position counts as risky.
const RISKY_POSITION_SCORE: u8 = 7;

/// Combine the three analyzer outputs into one risk analysis.
///
/// `warnings` is the concatenation of the analyzers' warning lists; it is
/// sorted most-severe-first (stable, so insertion order breaks ties) and
/// de-duplicated by warning id.
pub fn combine(
    concentration: ConcentrationRisk,
    cash: CashRisk,
    positions: Vec<PositionRisk>,
    mut warnings: Vec<RiskWarning>,
    analysis_date: DateTime<Utc>,
) -> RiskAnalysis {
    let mut score: i32 = 5;

    if concentration.diversification_score < 3 {
        score += 2;
    } else if concentration.diversification_score < 5 {
        score += 1;
    }

    match cash.level {
        RiskLevel::High => score += 2,
        RiskLevel::Medium => score += 1,
        RiskLevel::Low => {}
    }

    let risky_positions = positions
        .iter()
        .filter(|p| p.risk_score >= RISKY_POSITION_SCORE)
        .count() as i32;
    score += risky_positions.min(2);

    let risk_score = score.clamp(1, 10) as u8;

    warnings.sort_by_key(|w| w.severity.rank());
    let mut seen = HashSet::new();
    warnings.retain(|w| seen.insert(w.id.clone()));

    let mut recommendations = Vec::new();
    if risk_score >= 7 {
        recommendations
            .push("포트폴리오 위험도가 높습니다. 리밸런싱을 검토하세요.".to_string());
    }
    if concentration.diversification_score < 5 {
        recommendations.push("보유 종목 수가 적습니다. 분산 투자를 고려하세요.".to_string());
    }
    if cash.level == RiskLevel::High {
        recommendations.push("현금 비중이 낮습니다. 현금 확보를 우선하세요.".to_string());
    }

    RiskAnalysis {
        risk_score,
        warnings,
        recommendations,
        concentration,
        cash,
        positions,
        analysis_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_concentration(diversification: u8) -> ConcentrationRisk {
        ConcentrationRisk {
            top_positions: Vec::new(),
            sector_concentration: Vec::new(),
            diversification_score: diversification,
        }
    }

    fn make_cash(level: RiskLevel) -> CashRisk {
        CashRisk {
            current_cash_ratio_pct: 20.0,
            recommended_cash_ratio_pct: 10.0,
            utilization_rate_pct: 80.0,
            level,
            days_until_cash_out: 10,
        }
    }

    fn make_position_risk(symbol: &str, score: u8) -> PositionRisk {
        PositionRisk {
            symbol: symbol.to_string(),
            current_return_pct: 0.0,
            risk_score: score,
            consecutive_losses: 0,
            last_trade_date: Utc::now(),
            violations: Vec::new(),
        }
    }

    fn make_warning(id: &str, severity: RiskLevel) -> RiskWarning {
        RiskWarning {
            id: id.to_string(),
            severity,
            category: "테스트".to_string(),
            title: id.to_string(),
            message: String::new(),
            recommendation: None,
            can_proceed: true,
        }
    }

    #[test]
    fn test_baseline_score() {
        let analysis = combine(
            make_concentration(8),
            make_cash(RiskLevel::Low),
            Vec::new(),
            Vec::new(),
            Utc::now(),
        );
        assert_eq!(analysis.risk_score, 5);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_score_additions() {
        // div < 3 (+2), cash High (+2), two risky positions (+2) = 10 (clamped)
        let analysis = combine(
            make_concentration(2),
            make_cash(RiskLevel::High),
            vec![
                make_position_risk("A", 8),
                make_position_risk("B", 9),
                make_position_risk("C", 7),
            ],
            Vec::new(),
            Utc::now(),
        );
        assert_eq!(analysis.risk_score, 10);
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.contains("리밸런싱")));
        assert!(analysis.recommendations.iter().any(|r| r.contains("현금")));
    }

    #[test]
    fn test_moderate_additions() {
        // div 4 (+1), cash Medium (+1) = 7
        let analysis = combine(
            make_concentration(4),
            make_cash(RiskLevel::Medium),
            Vec::new(),
            Vec::new(),
            Utc::now(),
        );
        assert_eq!(analysis.risk_score, 7);
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.contains("분산 투자")));
    }

    #[test]
    fn test_warnings_sorted_and_deduplicated() {
        let warnings = vec![
            make_warning("low-1", RiskLevel::Low),
            make_warning("high-1", RiskLevel::High),
            make_warning("medium-1", RiskLevel::Medium),
            make_warning("high-1", RiskLevel::High), // duplicate id
        ];
        let analysis = combine(
            make_concentration(8),
            make_cash(RiskLevel::Low),
            Vec::new(),
            warnings,
            Utc::now(),
        );

        assert_eq!(analysis.warnings.len(), 3);
        assert_eq!(analysis.warnings[0].id, "high-1");
        assert_eq!(analysis.warnings[1].id, "medium-1");
        assert_eq!(analysis.warnings[2].id, "low-1");
    }
}
