//! Integration tests for investment pacing backed by the spend ledger.
//!
//! Pacing is cumulative: every executed purchase is recorded, and the next
//! evaluation sums the current day/month windows. These tests drive the full
//! record → re-evaluate loop through the engine facade.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use invest_guard::{
    CashBalance, CheckStatus, FixedClock, InMemoryStore, Portfolio, RiskEngine, RuleSetStore,
    SpendLedger, SqliteSpendLedger,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 14, 10, 30, 0).unwrap()
}

/// Capture engine logs in test output; repeated calls are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn setup_portfolio(store: &InMemoryStore) -> Uuid {
    init_tracing();
    let portfolio = Portfolio {
        id: Uuid::new_v4(),
        name: "테스트".to_string(),
        created_at: fixed_now() - Duration::days(100),
    };
    let id = portfolio.id;
    store.put_portfolio(portfolio).await;
    store
        .put_cash(
            id,
            CashBalance {
                total_balance: 10_000_000.0,
                cash_balance: 9_000_000.0,
                invested_amount: 1_000_000.0,
            },
        )
        .await;
    id
}

fn find_pacing(checklist: &invest_guard::InvestmentChecklist) -> &invest_guard::ChecklistItem {
    checklist
        .checks
        .iter()
        .find(|c| c.id == "investment-pacing")
        .unwrap()
}

#[tokio::test]
async fn test_executions_accumulate_into_daily_pacing() {
    let (engine, store, _ledger) = RiskEngine::in_memory();
    let engine = engine.with_clock(Arc::new(FixedClock::new(fixed_now())));
    let id = setup_portfolio(&store).await;

    // Daily ceiling is 500,000. First purchase fits.
    let checklist = engine
        .create_investment_checklist(id, "AAPL", 300_000.0)
        .await
        .unwrap();
    assert_eq!(find_pacing(&checklist).status, CheckStatus::Pass);
    engine.record_execution(id, "AAPL", 300_000.0).await.unwrap();

    // The same purchase again now breaches the daily ceiling.
    let checklist = engine
        .create_investment_checklist(id, "MSFT", 300_000.0)
        .await
        .unwrap();
    let pacing = find_pacing(&checklist);
    assert_eq!(pacing.status, CheckStatus::Warning);
    assert!(pacing.message.contains("일일"));
    // Pacing warns but never blocks
    assert!(checklist.can_proceed);
}

#[tokio::test]
async fn test_yesterdays_spend_counts_monthly_not_daily() {
    let (engine, store, ledger) = RiskEngine::in_memory();
    let engine = engine.with_clock(Arc::new(FixedClock::new(fixed_now())));
    let id = setup_portfolio(&store).await;

    // Backfill 1,900,000 spent yesterday, directly on the ledger
    ledger
        .record(invest_guard::ledger::LedgerEntry::new(
            id,
            "AAPL",
            1_900_000.0,
            fixed_now() - Duration::days(1),
        ))
        .await
        .unwrap();

    // 300,000 today: daily fine (300,000 < 500,000), monthly breached
    // (1,900,000 + 300,000 > 2,000,000)
    let checklist = engine
        .create_investment_checklist(id, "MSFT", 300_000.0)
        .await
        .unwrap();
    let pacing = find_pacing(&checklist);
    assert_eq!(pacing.status, CheckStatus::Warning);
    assert!(pacing.message.contains("월간"));
    assert!(!pacing.message.contains("일일"));
}

#[tokio::test]
async fn test_last_months_spend_is_out_of_window() {
    let (engine, store, ledger) = RiskEngine::in_memory();
    let engine = engine.with_clock(Arc::new(FixedClock::new(fixed_now())));
    let id = setup_portfolio(&store).await;

    ledger
        .record(invest_guard::ledger::LedgerEntry::new(
            id,
            "AAPL",
            5_000_000.0,
            fixed_now() - Duration::days(45),
        ))
        .await
        .unwrap();

    let checklist = engine
        .create_investment_checklist(id, "MSFT", 300_000.0)
        .await
        .unwrap();
    assert_eq!(find_pacing(&checklist).status, CheckStatus::Pass);
}

#[tokio::test]
async fn test_pacing_with_sqlite_ledger() {
    let store = Arc::new(InMemoryStore::new());
    let ledger = Arc::new(SqliteSpendLedger::open_in_memory().unwrap());
    let engine = RiskEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        ledger,
    )
    .with_clock(Arc::new(FixedClock::new(fixed_now())));
    let id = setup_portfolio(&store).await;

    engine.record_execution(id, "AAPL", 450_000.0).await.unwrap();

    let checklist = engine
        .create_investment_checklist(id, "AAPL", 100_000.0)
        .await
        .unwrap();
    let pacing = find_pacing(&checklist);
    assert_eq!(pacing.status, CheckStatus::Warning);
    assert!(pacing.message.contains("일일"));
}

#[tokio::test]
async fn test_tightened_rules_affect_next_evaluation() {
    let (engine, store, _ledger) = RiskEngine::in_memory();
    let engine = engine.with_clock(Arc::new(FixedClock::new(fixed_now())));
    let id = setup_portfolio(&store).await;

    let checklist = engine
        .create_investment_checklist(id, "AAPL", 200_000.0)
        .await
        .unwrap();
    assert_eq!(find_pacing(&checklist).status, CheckStatus::Pass);

    // Tighten the daily ceiling below the planned amount
    store
        .update(
            id,
            invest_guard::RuleSetPatch {
                max_daily_investment: Some(150_000.0),
                ..invest_guard::RuleSetPatch::default()
            },
        )
        .await
        .unwrap();

    let checklist = engine
        .create_investment_checklist(id, "AAPL", 200_000.0)
        .await
        .unwrap();
    assert_eq!(find_pacing(&checklist).status, CheckStatus::Warning);
}
