//! Ledger domain types.
//!
//! Expenses and settlements are owned and persisted by the surrounding
//! application; the engine treats them as immutable inputs. Everything else
//! in this module is derived per computation and discarded afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use splitr_shared::types::{ExpenseId, GroupId, Money, SettlementId, UserId};

/// One user's share of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// The user this share belongs to.
    pub user_id: UserId,
    /// Share amount.
    pub amount: Money,
    /// Share already reconciled outside the ledger (e.g. paid in cash).
    /// Paid shares never produce a debt.
    #[serde(default)]
    pub paid: bool,
}

impl Split {
    /// Creates an unpaid share.
    #[must_use]
    pub fn unpaid(user_id: UserId, amount: Money) -> Self {
        Self {
            user_id,
            amount,
            paid: false,
        }
    }

    /// Creates a share that is already settled.
    #[must_use]
    pub fn paid(user_id: UserId, amount: Money) -> Self {
        Self {
            user_id,
            amount,
            paid: true,
        }
    }
}

/// An expense paid by one user and split among participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Total amount. Equals the sum of `splits` within the write-path tolerance.
    pub amount: Money,
    /// The user who paid.
    pub paid_by: UserId,
    /// The group this expense belongs to, `None` for personal expenses.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Spending category.
    #[serde(default)]
    pub category: Option<String>,
    /// When the expense happened.
    pub date: DateTime<Utc>,
    /// Per-user shares.
    pub splits: Vec<Split>,
}

impl Expense {
    /// Returns true if `user` paid or has a share on this expense.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.paid_by == user || self.splits.iter().any(|s| s.user_id == user)
    }

    /// Returns `user`'s share, paid or not.
    #[must_use]
    pub fn share_of(&self, user: UserId) -> Option<&Split> {
        self.splits.iter().find(|s| s.user_id == user)
    }

    /// Returns the amount of `user`'s unpaid share, if any.
    #[must_use]
    pub fn unpaid_share_of(&self, user: UserId) -> Option<Money> {
        self.splits
            .iter()
            .find(|s| s.user_id == user && !s.paid)
            .map(|s| s.amount)
    }

    /// Returns true if this is a personal (non-group) expense.
    #[must_use]
    pub fn is_personal(&self) -> bool {
        self.group_id.is_none()
    }
}

/// A direct payment that reduces an existing debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Settlement ID.
    pub id: SettlementId,
    /// Amount paid, always positive.
    pub amount: Money,
    /// The user who paid.
    pub paid_by: UserId,
    /// The user who received the payment.
    pub received_by: UserId,
    /// The group this settlement belongs to, `None` for personal settlements.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// When the payment happened.
    pub date: DateTime<Utc>,
    /// Optional note.
    #[serde(default)]
    pub note: Option<String>,
}

impl Settlement {
    /// Returns true if `user` is payer or receiver.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.paid_by == user || self.received_by == user
    }

    /// Returns true if the endpoints are exactly `a` and `b`, in either direction.
    #[must_use]
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.paid_by == a && self.received_by == b) || (self.paid_by == b && self.received_by == a)
    }
}

/// A directed monetary edge: `debtor` owes `creditor` `amount`.
///
/// Settlement-derived edges use the same shape and cancel up to `amount` of
/// what `debtor` owed `creditor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtEdge {
    /// Who owes.
    pub debtor: UserId,
    /// Who is owed.
    pub creditor: UserId,
    /// How much.
    pub amount: Money,
}

impl DebtEdge {
    /// Returns true if this edge runs from `debtor` to `creditor`.
    #[must_use]
    pub fn runs(&self, debtor: UserId, creditor: UserId) -> bool {
        self.debtor == debtor && self.creditor == creditor
    }
}

/// Amounts a counterparty owes the subject (`owed`) and the subject owes the
/// counterparty (`owing`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// What the counterparty owes the subject.
    pub owed: Money,
    /// What the subject owes the counterparty.
    pub owing: Money,
}

impl Balance {
    /// Net position: positive when the counterparty owes the subject.
    #[must_use]
    pub fn net(&self) -> Money {
        self.owed - self.owing
    }

    /// Classifies the net position.
    #[must_use]
    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::from_net(self.net())
    }
}

/// Direction of a net position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    /// The subject is owed money.
    Owed,
    /// The subject owes money.
    Owes,
    /// Nothing outstanding.
    Settled,
}

impl BalanceStatus {
    /// Classifies a signed net amount.
    #[must_use]
    pub fn from_net(net: Money) -> Self {
        if net.is_positive() {
            Self::Owed
        } else if net.is_negative() {
            Self::Owes
        } else {
            Self::Settled
        }
    }

    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Owed => "You are owed money",
            Self::Owes => "You owe money",
            Self::Settled => "You are all settled up",
        }
    }
}

/// A counterparty paired with a strictly positive amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyAmount {
    /// The other user.
    pub counterparty_id: UserId,
    /// Amount, always greater than zero.
    pub amount: Money,
}
