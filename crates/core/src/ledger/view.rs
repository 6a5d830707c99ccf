//! Subject-centred views used by the settle-up and group screens.

use serde::{Deserialize, Serialize};
use splitr_shared::types::{GroupId, Money, UserId};
use tracing::{debug, instrument, warn};

use super::error::LedgerError;
use super::group::MemberIndex;
use super::pair::pair_balance;
use super::settlement::resolve_settlement_edge;
use super::split::edges_for_subject;
use super::types::{Balance, BalanceStatus, Expense, Settlement};

/// Signed position of `subject` within a group.
///
/// Positive when the group owes the subject. Settlements are applied
/// without clamping, so the result equals the subject's running total in
/// [`super::group::GroupLedger`] for the same rows.
pub fn group_position<'a, 'b, E, S>(subject: UserId, expenses: E, settlements: S) -> Money
where
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'b Settlement>,
{
    let mut position = Money::ZERO;
    for expense in expenses {
        for edge in edges_for_subject(expense, subject) {
            if edge.creditor == subject {
                position += edge.amount;
            } else {
                position -= edge.amount;
            }
        }
    }
    for settlement in settlements {
        if settlement.paid_by == subject {
            position += settlement.amount;
        } else if settlement.received_by == subject {
            position -= settlement.amount;
        }
    }
    position
}

/// Settle-up view against a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettlement {
    /// The other user.
    pub counterpart: UserId,
    /// Clamped balance from the subject's side.
    pub balance: Balance,
    /// Direction of `balance.net()`.
    pub status: BalanceStatus,
}

/// One member's line in a group settle-up view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPosition {
    /// The other member.
    pub member_id: UserId,
    /// Clamped balance from the subject's side.
    pub balance: Balance,
    /// Direction of `balance.net()`.
    pub status: BalanceStatus,
}

/// Settle-up view against every other member of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettlement {
    /// The group.
    pub group: GroupId,
    /// One entry per other member, in member order.
    pub balances: Vec<MemberPosition>,
}

impl GroupSettlement {
    /// Sum of the per-member nets.
    #[must_use]
    pub fn net(&self) -> Money {
        self.balances.iter().map(|m| m.balance.net()).sum()
    }
}

/// What the subject is settling up with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettlementView {
    /// A single counterpart.
    User(UserSettlement),
    /// Every other member of a group.
    Group(GroupSettlement),
}

impl SettlementView {
    /// Net amount across the whole view.
    #[must_use]
    pub fn net(&self) -> Money {
        match self {
            Self::User(view) => view.balance.net(),
            Self::Group(view) => view.net(),
        }
    }

    /// Direction of [`Self::net`].
    #[must_use]
    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::from_net(self.net())
    }
}

/// Target of a settlement view request.
#[derive(Debug, Clone, Copy)]
pub enum SettlementTarget<'m> {
    /// Another user.
    User(UserId),
    /// A group and its member ids.
    Group {
        /// The group.
        group: GroupId,
        /// Its members, the subject included.
        members: &'m [UserId],
    },
}

/// Builds the settle-up view of `subject` against `target`.
///
/// # Errors
///
/// - `LedgerError::SelfPair` when the target user is the subject.
/// - `LedgerError::NotGroupMember` when the subject is not in the group.
#[instrument(skip_all, fields(subject = %subject))]
pub fn settlement_view<'a, 'b, E, S>(
    subject: UserId,
    target: SettlementTarget<'_>,
    expenses: E,
    settlements: S,
) -> Result<SettlementView, LedgerError>
where
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'b Settlement>,
{
    match target {
        SettlementTarget::User(counterpart) => {
            if counterpart == subject {
                return Err(LedgerError::SelfPair(subject));
            }
            let balance = pair_balance(subject, counterpart, expenses, settlements);
            Ok(SettlementView::User(UserSettlement {
                counterpart,
                balance,
                status: balance.status(),
            }))
        }
        SettlementTarget::Group { group, members } => {
            let balances = group_member_balances(subject, members, expenses, settlements)?;
            Ok(SettlementView::Group(GroupSettlement { group, balances }))
        }
    }
}

/// Clamped balance of `subject` against each other member of a group.
///
/// Uses the same rules as [`pair_balance`] for every member at once.
/// Edges with a counterparty outside `members` are skipped.
///
/// # Errors
///
/// Returns `LedgerError::NotGroupMember` when `subject` is not in `members`.
pub fn group_member_balances<'a, 'b, E, S>(
    subject: UserId,
    members: &[UserId],
    expenses: E,
    settlements: S,
) -> Result<Vec<MemberPosition>, LedgerError>
where
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'b Settlement>,
{
    if !members.contains(&subject) {
        return Err(LedgerError::NotGroupMember(subject));
    }

    let others = MemberIndex::new(members.iter().copied().filter(|m| *m != subject));
    let mut balances = vec![Balance::default(); others.len()];
    let mut skipped = 0usize;

    for expense in expenses {
        for edge in edges_for_subject(expense, subject) {
            let (counterparty, owed_to_subject) = if edge.creditor == subject {
                (edge.debtor, true)
            } else {
                (edge.creditor, false)
            };
            let Some(i) = others.position(counterparty) else {
                skipped += 1;
                warn!(counterparty = %counterparty, expense_id = %expense.id, "skipping edge outside the member set");
                continue;
            };
            if owed_to_subject {
                balances[i].owed += edge.amount;
            } else {
                balances[i].owing += edge.amount;
            }
        }
    }

    for settlement in settlements {
        let edge = resolve_settlement_edge(settlement);
        if edge.debtor == subject {
            if let Some(i) = others.position(edge.creditor) {
                balances[i].owing = balances[i].owing.clamped_sub(edge.amount);
            }
        } else if edge.creditor == subject {
            if let Some(i) = others.position(edge.debtor) {
                balances[i].owed = balances[i].owed.clamped_sub(edge.amount);
            }
        }
    }

    debug!(members = others.len(), skipped_edges = skipped, "group member balances computed");

    Ok(others
        .members()
        .iter()
        .zip(balances)
        .map(|(member_id, balance)| MemberPosition {
            member_id: *member_id,
            balance,
            status: balance.status(),
        })
        .collect())
}
