//! Ledger error types.
//!
//! The read-side engine only fails on requests that make no sense (a user
//! compared with themselves, a subject outside the group being viewed).
//! The remaining variants come from the write-path checks in
//! [`super::validation`] and the split planner in [`crate::allocation`].

use rust_decimal::Decimal;
use splitr_shared::AppError;
use splitr_shared::types::{Money, UserId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Query Errors ==========
    /// A pair balance was requested between a user and themselves.
    #[error("Cannot compute a balance between user {0} and themselves")]
    SelfPair(UserId),

    /// The user is not in the member set.
    #[error("User {0} is not a member of the group")]
    NotGroupMember(UserId),

    // ========== Validation Errors ==========
    /// Amount must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    /// A split carries a negative amount.
    #[error("Split amount for user {user} cannot be negative: {amount}")]
    NegativeSplitAmount {
        /// Owner of the split.
        user: UserId,
        /// The offending amount.
        amount: Money,
    },

    /// Splits do not add up to the expense total.
    #[error("Split amounts must add up to the total. Expected: {expected}, Actual: {actual}")]
    SplitSumMismatch {
        /// Expense total.
        expected: Money,
        /// Sum of splits.
        actual: Money,
    },

    /// Payer and receiver of a settlement are the same user.
    #[error("Payer and receiver cannot be the same user")]
    SamePayerAndReceiver,

    /// Expense has no participants.
    #[error("Expense must have at least one split")]
    EmptySplit,

    /// The same user appears in more than one split.
    #[error("User {0} appears in more than one split")]
    DuplicateSplitUser(UserId),

    /// Percentages do not add up to 100.
    #[error("Percentages must add up to 100, got {total}")]
    InvalidPercentages {
        /// Sum of the supplied percentages.
        total: Decimal,
    },

    /// Number of shares does not match number of participants.
    #[error("Expected {expected} shares, got {actual}")]
    ShareCountMismatch {
        /// Number of participants.
        expected: usize,
        /// Number of supplied shares.
        actual: usize,
    },

    /// Rounding scale beyond what `Decimal` can represent.
    #[error("Scale {0} exceeds the maximum of 28")]
    UnsupportedScale(u32),
}

impl LedgerError {
    /// Returns the machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SelfPair(_) => "SELF_PAIR",
            Self::NotGroupMember(_) => "NOT_GROUP_MEMBER",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::NegativeSplitAmount { .. } => "NEGATIVE_SPLIT_AMOUNT",
            Self::SplitSumMismatch { .. } => "SPLIT_SUM_MISMATCH",
            Self::SamePayerAndReceiver => "SAME_PAYER_AND_RECEIVER",
            Self::EmptySplit => "EMPTY_SPLIT",
            Self::DuplicateSplitUser(_) => "DUPLICATE_SPLIT_USER",
            Self::InvalidPercentages { .. } => "INVALID_PERCENTAGES",
            Self::ShareCountMismatch { .. } => "SHARE_COUNT_MISMATCH",
            Self::UnsupportedScale(_) => "UNSUPPORTED_SCALE",
        }
    }

    /// Returns true for errors caused by malformed write-path input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::SelfPair(_) | Self::NotGroupMember(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        if err.is_validation() {
            Self::Validation(err.to_string())
        } else {
            Self::Ledger(err.to_string())
        }
    }
}
