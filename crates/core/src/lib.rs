//! Core business logic for Splitr.
//!
//! This crate contains the pure balance engine with ZERO web or database
//! dependencies. Callers fetch expense and settlement rows, pass them in,
//! and get derived balances back.
//!
//! # Modules
//!
//! - `ledger` - Debt edges, pairwise balances, group ledgers and aggregate debts
//! - `allocation` - Splitting an expense total into exact per-user shares
//! - `spending` - Per-user spending statistics

pub mod allocation;
pub mod ledger;
pub mod spending;

pub use allocation::{SplitPlan, plan_splits};
