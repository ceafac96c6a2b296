//! Invest Guard Library
//!
//! This library evaluates investment decisions against per-portfolio risk
//! rules: portfolio-wide risk analysis, a pre-purchase checklist, and an
//! execution gate with an auditable override path.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     invest-guard (Rust Library)                     │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐     │
//! │  │  Risk           │  │  Checklist      │  │  Execution      │     │
//! │  │  Analyzers      │  │  Builder        │  │  Gate           │     │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘     │
//! │           │                    │                    │              │
//! │  ┌────────┴────────────────────┴────────────────────┴────────┐     │
//! │  │   Stores (rules / portfolio / positions / cash / trades)  │     │
//! │  │   Spend Ledger (SQLite or in-memory, append-only)         │     │
//! │  └───────────────────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Advisory-first evaluation
//! - Only hard affordability and absolute sizing failures block a purchase
//! - Pacing, cooldown, loss-streak and risk-score breaches warn but pass
//! - A blocked purchase can still proceed with a recorded override reason
//!
//! ## Snapshot evaluation
//! - All inputs are fetched up front, then evaluation is pure and synchronous
//! - The same snapshots always produce the same verdict
//!
//! ## Fail-safe degradation
//! - A missing cash balance yields the highest cash-risk posture and blocks
//!   the affordability check rather than guessing

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod checklist;
pub mod clock;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod portfolio;
pub mod risk;
pub mod rules;
pub mod sector;
pub mod store;

pub use checklist::gate::{ExecutionApproval, OverrideRecord};
pub use checklist::{CheckStatus, ChecklistItem, InvestmentChecklist};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::RiskEngine;
pub use error::{GateError, StoreError};
pub use ledger::{MemorySpendLedger, SpendLedger, SqliteLedgerConfig, SqliteSpendLedger};
pub use portfolio::{CashBalance, ClosedTrade, Portfolio, Position};
pub use risk::{RiskAnalysis, RiskLevel, RiskWarning};
pub use rules::{RuleSet, RuleSetPatch};
pub use sector::{SectorClassifier, StaticSectorClassifier};
pub use store::{
    CashBalanceStore, InMemoryStore, PortfolioStore, PositionStore, RuleSetStore,
    TradeHistoryStore,
};
