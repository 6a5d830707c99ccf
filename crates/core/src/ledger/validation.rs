//! Write-path validation for expenses and settlements.
//!
//! The balance engine never calls these: it reads whatever rows exist.
//! Callers run them before persisting a new row.

use std::collections::HashSet;

use rust_decimal::Decimal;
use splitr_shared::types::{Money, UserId};

use super::error::LedgerError;
use super::types::{Expense, Settlement};

/// Validates a new expense.
///
/// Checks, in order: positive total, at least one split, no negative split,
/// no user split twice, and splits adding up to the total within `tolerance`.
///
/// # Errors
///
/// Returns the first rule the expense violates.
pub fn validate_expense(expense: &Expense, tolerance: Decimal) -> Result<(), LedgerError> {
    if !expense.amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount(expense.amount));
    }

    if expense.splits.is_empty() {
        return Err(LedgerError::EmptySplit);
    }

    let mut seen = HashSet::with_capacity(expense.splits.len());
    for split in &expense.splits {
        if split.amount.is_negative() {
            return Err(LedgerError::NegativeSplitAmount {
                user: split.user_id,
                amount: split.amount,
            });
        }
        if !seen.insert(split.user_id) {
            return Err(LedgerError::DuplicateSplitUser(split.user_id));
        }
    }

    let actual: Money = expense.splits.iter().map(|s| s.amount).sum();
    if (actual - expense.amount).abs().amount() > tolerance {
        return Err(LedgerError::SplitSumMismatch {
            expected: expense.amount,
            actual,
        });
    }

    Ok(())
}

/// Validates a new settlement.
///
/// When `members` is given (group settlements) both parties must be in it.
///
/// # Errors
///
/// Returns the first rule the settlement violates.
pub fn validate_settlement(
    settlement: &Settlement,
    members: Option<&[UserId]>,
) -> Result<(), LedgerError> {
    if !settlement.amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount(settlement.amount));
    }

    if settlement.paid_by == settlement.received_by {
        return Err(LedgerError::SamePayerAndReceiver);
    }

    if let Some(members) = members {
        for user in [settlement.paid_by, settlement.received_by] {
            if !members.contains(&user) {
                return Err(LedgerError::NotGroupMember(user));
            }
        }
    }

    Ok(())
}
