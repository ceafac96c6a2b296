//! Concentration analysis: per-position share, sector share and a
//! diversification score.
//!
//! The diversification score is a deliberate simplification (distinct-symbol
//! count capped at 10, floored at 1), not a statistically rigorous measure.

use std::collections::{BTreeMap, HashSet};

use crate::portfolio::Position;
use crate::rules::RuleSet;
use crate::sector::SectorClassifier;

use super::{ConcentrationRisk, PositionShare, RiskLevel, RiskWarning, SectorShare};

/// Share of the position-size limit at which a position is flagged MEDIUM.
const NEAR_LIMIT_FACTOR: f64 = 0.8;

/// Analyze position and sector concentration.
pub fn analyze(
    positions: &[Position],
    rules: &RuleSet,
    classifier: &dyn SectorClassifier,
) -> (ConcentrationRisk, Vec<RiskWarning>) {
    let total_value: f64 = positions.iter().map(|p| p.value()).sum();

    let mut shares: Vec<PositionShare> = positions
        .iter()
        .map(|p| {
            let percentage = if total_value > 0.0 {
                p.value() / total_value * 100.0
            } else {
                0.0
            };
            let tier = if percentage > rules.max_position_size_pct {
                RiskLevel::High
            } else if percentage > NEAR_LIMIT_FACTOR * rules.max_position_size_pct {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            };
            PositionShare {
                symbol: p.symbol.clone(),
                percentage,
                tier,
            }
        })
        .collect();

    shares.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // BTreeMap keeps sector output deterministic
    let mut by_sector: BTreeMap<String, f64> = BTreeMap::new();
    for share in &shares {
        let sector = classifier.classify(&share.symbol);
        *by_sector.entry(sector).or_insert(0.0) += share.percentage;
    }
    let mut sector_concentration: Vec<SectorShare> = by_sector
        .into_iter()
        .map(|(sector, percentage)| SectorShare { sector, percentage })
        .collect();
    sector_concentration.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let distinct: HashSet<&str> = positions.iter().map(|p| p.symbol.as_str()).collect();
    let diversification_score = (distinct.len().min(10) as u8).max(1);

    let mut warnings = Vec::new();
    if rules.enable_warnings {
        for share in &shares {
            if share.tier == RiskLevel::High {
                warnings.push(RiskWarning {
                    id: format!("concentration-{}", share.symbol),
                    severity: RiskLevel::High,
                    category: "집중도".to_string(),
                    title: "포지션 집중".to_string(),
                    message: format!(
                        "{} 비중 {:.1}%가 한도 {:.0}%를 초과했습니다",
                        share.symbol, share.percentage, rules.max_position_size_pct
                    ),
                    recommendation: Some("해당 종목의 비중 축소를 검토하세요".to_string()),
                    can_proceed: true,
                });
            }
        }
        for sector in &sector_concentration {
            if sector.percentage > rules.max_sector_concentration_pct {
                warnings.push(RiskWarning {
                    id: format!("sector-{}", sector.sector),
                    severity: RiskLevel::Medium,
                    category: "집중도".to_string(),
                    title: "섹터 집중".to_string(),
                    message: format!(
                        "{} 섹터 비중 {:.1}%가 한도 {:.0}%를 초과했습니다",
                        sector.sector, sector.percentage, rules.max_sector_concentration_pct
                    ),
                    recommendation: Some("섹터 분산을 고려하세요".to_string()),
                    can_proceed: true,
                });
            }
        }
    }

    let top_positions = shares.into_iter().take(5).collect();

    (
        ConcentrationRisk {
            top_positions,
            sector_concentration,
            diversification_score,
        },
        warnings,
    )
}
