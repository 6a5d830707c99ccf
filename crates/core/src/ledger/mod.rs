//! Balance and ledger computation.
//!
//! This module implements the read-side engine:
//! - Domain types for expenses, splits and settlements
//! - Split and settlement resolution into directed debt edges
//! - Pairwise balances between two users
//! - Group ledgers with netting
//! - Per-user aggregate debts and reminders
//! - Subject-centred settle-up views
//! - Write-path validation offered to callers
//!
//! Every function is pure: rows go in, derived balances come out, nothing
//! is cached between calls.

pub mod debts;
pub mod error;
pub mod filter;
pub mod group;
pub mod pair;
pub mod settlement;
pub mod split;
pub mod types;
pub mod validation;
pub mod view;

#[cfg(test)]
mod group_props;
#[cfg(test)]
mod pair_props;

pub use debts::{
    OutstandingDebt, OweDetails, ReminderPolicy, UserBalances, UserReminder,
    extract_outstanding_debts, outstanding_debts_for_all, resolve_user_balances,
};
pub use error::LedgerError;
pub use filter::{expenses_between, settlements_between};
pub use group::{GroupLedger, MemberBalance, MemberIndex, OwedByEntry, OwesEntry, build_group_ledger};
pub use pair::{pair_balance, resolve_pair_balance};
pub use settlement::resolve_settlement_edge;
pub use split::{edges_for_subject, resolve_expense_edges};
pub use types::{
    Balance, BalanceStatus, CounterpartyAmount, DebtEdge, Expense, Settlement, Split,
};
pub use validation::{validate_expense, validate_settlement};
pub use view::{
    GroupSettlement, MemberPosition, SettlementTarget, SettlementView, UserSettlement,
    group_member_balances, group_position, settlement_view,
};
