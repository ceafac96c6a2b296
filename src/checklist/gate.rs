//! Execution authorization for a prospective purchase.
//!
//! The gate branches on the checklist verdict:
//! - proceed with no warnings: execute immediately
//! - proceed with warnings: present warnings, no justification needed
//! - blocked: execution requires an explicit, non-empty override reason
//!
//! The override is the only bypass path and it is never silent: the approval
//! carries the checklist snapshot and the override record, and the caller is
//! expected to persist both alongside the trade execution for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GateError;

use super::InvestmentChecklist;

/// A recorded override of a blocked checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// Free-text justification supplied by the user
    pub reason: String,
    /// When the override was granted
    pub decided_at: DateTime<Utc>,
}

/// Permission to execute a planned purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionApproval {
    /// The checklist this approval was granted against
    pub checklist: InvestmentChecklist,
    /// Present when a blocking failure was explicitly overridden
    pub override_record: Option<OverrideRecord>,
}

/// Authorize execution against an evaluated checklist.
///
/// A blocked checklist is only approvable with a non-empty override reason;
/// a blank reason is rejected separately so callers can surface a precise
/// validation message.
pub fn authorize(
    checklist: InvestmentChecklist,
    override_reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ExecutionApproval, GateError> {
    if checklist.can_proceed {
        return Ok(ExecutionApproval {
            checklist,
            override_record: None,
        });
    }

    match override_reason.map(str::trim) {
        Some(reason) if !reason.is_empty() => {
            tracing::warn!(
                symbol = %checklist.symbol,
                planned_amount = checklist.planned_amount,
                reason,
                "Blocked purchase overridden"
            );
            Ok(ExecutionApproval {
                checklist,
                override_record: Some(OverrideRecord {
                    reason: reason.to_string(),
                    decided_at: now,
                }),
            })
        }
        Some(_) => Err(GateError::EmptyOverrideReason),
        None => Err(GateError::Blocked {
            failures: checklist.blocking_failures(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{CheckStatus, ChecklistItem};
    use crate::risk::RiskLevel;
    use uuid::Uuid;

    fn make_checklist(can_proceed: bool) -> InvestmentChecklist {
        let status = if can_proceed {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        InvestmentChecklist {
            portfolio_id: Uuid::nil(),
            symbol: "AAPL".to_string(),
            planned_amount: 50_000.0,
            checks: vec![ChecklistItem {
                id: "cash-availability".to_string(),
                category: "현금".to_string(),
                title: "현금 가용성".to_string(),
                status,
                message: String::new(),
                recommendation: None,
                is_blocking: true,
            }],
            overall_risk: if can_proceed {
                RiskLevel::Low
            } else {
                RiskLevel::High
            },
            can_proceed,
            warnings: Vec::new(),
            evaluated_at: Utc::now(),
        }
    }

    #[test]
    fn test_clean_checklist_approved_without_override() {
        let approval = authorize(make_checklist(true), None, Utc::now()).unwrap();
        assert!(approval.override_record.is_none());
    }

    #[test]
    fn test_blocked_without_reason_is_rejected() {
        let err = authorize(make_checklist(false), None, Utc::now()).unwrap_err();
        match err {
            GateError::Blocked { failures } => {
                assert_eq!(failures, vec!["현금 가용성".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blocked_with_blank_reason_is_rejected() {
        let err = authorize(make_checklist(false), Some("   "), Utc::now()).unwrap_err();
        assert!(matches!(err, GateError::EmptyOverrideReason));
    }

    #[test]
    fn test_blocked_with_reason_is_approved_with_record() {
        let now = Utc::now();
        let approval =
            authorize(make_checklist(false), Some("분할 매수 계획의 마지막 회차"), now).unwrap();
        let record = approval.override_record.unwrap();
        assert_eq!(record.reason, "분할 매수 계획의 마지막 회차");
        assert_eq!(record.decided_at, now);
    }
}
