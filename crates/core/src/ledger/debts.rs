//! Aggregate debts of one user against every counterparty.
//!
//! Two read models share the same per-counterparty folding:
//! - [`resolve_user_balances`] feeds the dashboard ("you owe" / "you are owed").
//! - [`extract_outstanding_debts`] feeds debt reminders and tracks how long
//!   each debt has been outstanding.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use splitr_shared::config::ReminderConfig;
use splitr_shared::types::{Money, UserId};
use tracing::{debug, instrument, warn};

use super::split::edges_for_subject;
use super::types::{Balance, CounterpartyAmount, Expense, Settlement};

/// Per-counterparty accumulator that remembers first-insertion order.
///
/// Sorting the extracted lists is stable, so ties keep this order.
#[derive(Debug)]
struct Accumulator<T> {
    entries: Vec<(UserId, T)>,
    positions: HashMap<UserId, usize>,
}

impl<T> Accumulator<T> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn entry(&mut self, counterparty: UserId, init: impl FnOnce() -> T) -> &mut T {
        let index = match self.positions.get(&counterparty) {
            Some(index) => *index,
            None => {
                self.entries.push((counterparty, init()));
                let index = self.entries.len() - 1;
                self.positions.insert(counterparty, index);
                index
            }
        };
        &mut self.entries[index].1
    }

    fn get_mut(&mut self, counterparty: UserId) -> Option<&mut T> {
        let index = *self.positions.get(&counterparty)?;
        Some(&mut self.entries[index].1)
    }

    fn into_entries(self) -> Vec<(UserId, T)> {
        self.entries
    }
}

/// Per-counterparty breakdown of a user's balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OweDetails {
    /// Counterparties the subject owes, largest first.
    pub you_owe: Vec<CounterpartyAmount>,
    /// Counterparties who owe the subject, largest first.
    pub you_are_owed_by: Vec<CounterpartyAmount>,
}

/// Dashboard totals for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalances {
    /// Total the subject owes, after settlements.
    pub you_owe: Money,
    /// Total owed to the subject, after settlements.
    pub you_are_owed: Money,
    /// `you_are_owed - you_owe`.
    pub total_balance: Money,
    /// Per-counterparty lists, zero nets omitted.
    pub owe_details: OweDetails,
}

/// Computes dashboard balances for `subject`.
///
/// Callers pass the subject's personal (non-group) rows. Settlements are
/// applied without clamping, so an over-payment shows up as the other side
/// now owing. Settlements that do not involve the subject are skipped.
#[instrument(skip_all, fields(subject = %subject))]
pub fn resolve_user_balances<'a, 'b, E, S>(
    subject: UserId,
    expenses: E,
    settlements: S,
) -> UserBalances
where
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'b Settlement>,
{
    let mut by_counterparty: Accumulator<Balance> = Accumulator::new();
    let mut you_owe = Money::ZERO;
    let mut you_are_owed = Money::ZERO;

    for expense in expenses {
        for edge in edges_for_subject(expense, subject) {
            if edge.creditor == subject {
                you_are_owed += edge.amount;
                by_counterparty.entry(edge.debtor, Balance::default).owed += edge.amount;
            } else {
                you_owe += edge.amount;
                by_counterparty.entry(edge.creditor, Balance::default).owing += edge.amount;
            }
        }
    }

    for settlement in settlements {
        if settlement.paid_by == subject {
            you_owe -= settlement.amount;
            by_counterparty
                .entry(settlement.received_by, Balance::default)
                .owing -= settlement.amount;
        } else if settlement.received_by == subject {
            you_are_owed -= settlement.amount;
            by_counterparty
                .entry(settlement.paid_by, Balance::default)
                .owed -= settlement.amount;
        } else {
            warn!(settlement_id = %settlement.id, "skipping settlement that does not involve the subject");
        }
    }

    let mut details = OweDetails::default();
    for (counterparty_id, balance) in by_counterparty.into_entries() {
        let net = balance.net();
        let entry = CounterpartyAmount {
            counterparty_id,
            amount: net.abs(),
        };
        if net.is_positive() {
            details.you_are_owed_by.push(entry);
        } else if net.is_negative() {
            details.you_owe.push(entry);
        }
    }
    details.you_owe.sort_by(|a, b| b.amount.cmp(&a.amount));
    details.you_are_owed_by.sort_by(|a, b| b.amount.cmp(&a.amount));

    debug!(
        you_owe = %you_owe,
        you_are_owed = %you_are_owed,
        owe_count = details.you_owe.len(),
        owed_by_count = details.you_are_owed_by.len(),
        "user balances resolved"
    );

    UserBalances {
        you_owe,
        you_are_owed,
        total_balance: you_are_owed - you_owe,
        owe_details: details,
    }
}

/// A debt the subject still owes, with the date it has been outstanding since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingDebt {
    /// Creditor.
    pub counterparty_id: UserId,
    /// Amount owed, always positive.
    pub amount: Money,
    /// Earliest date among the expenses that created the debt.
    pub since: DateTime<Utc>,
}

#[derive(Debug)]
struct ReminderEntry {
    /// Positive when the subject owes the counterparty.
    amount: Money,
    owing_since: Option<DateTime<Utc>>,
    first_seen: DateTime<Utc>,
}

impl ReminderEntry {
    fn new(date: DateTime<Utc>) -> Self {
        Self {
            amount: Money::ZERO,
            owing_since: None,
            first_seen: date,
        }
    }

    fn touch(&mut self, date: DateTime<Utc>) {
        self.first_seen = self.first_seen.min(date);
    }
}

/// Lists everyone `subject` owes money to, largest debt first.
///
/// Expenses build one running amount per counterparty. A settlement only
/// adjusts a counterparty that already has an expense relationship with the
/// subject. Counterparties whose net is zero or in the subject's favor are
/// omitted.
///
/// `since` is the earliest date of an expense on which the subject owed the
/// counterparty, or the earliest shared expense if there is none.
#[instrument(skip_all, fields(subject = %subject))]
pub fn extract_outstanding_debts<'a, 'b, E, S>(
    subject: UserId,
    expenses: E,
    settlements: S,
) -> Vec<OutstandingDebt>
where
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'b Settlement>,
{
    let mut ledger: Accumulator<ReminderEntry> = Accumulator::new();

    for expense in expenses {
        for edge in edges_for_subject(expense, subject) {
            if edge.debtor == subject {
                let entry = ledger.entry(edge.creditor, || ReminderEntry::new(expense.date));
                entry.touch(expense.date);
                entry.amount += edge.amount;
                entry.owing_since = Some(
                    entry
                        .owing_since
                        .map_or(expense.date, |since| since.min(expense.date)),
                );
            } else {
                let entry = ledger.entry(edge.debtor, || ReminderEntry::new(expense.date));
                entry.touch(expense.date);
                entry.amount -= edge.amount;
            }
        }
    }

    let mut unmatched = 0usize;
    for settlement in settlements {
        let (counterparty, delta) = if settlement.paid_by == subject {
            (settlement.received_by, -settlement.amount)
        } else if settlement.received_by == subject {
            (settlement.paid_by, settlement.amount)
        } else {
            continue;
        };
        match ledger.get_mut(counterparty) {
            Some(entry) => entry.amount += delta,
            None => unmatched += 1,
        }
    }

    let mut debts: Vec<OutstandingDebt> = ledger
        .into_entries()
        .into_iter()
        .filter(|(_, entry)| entry.amount.is_positive())
        .map(|(counterparty_id, entry)| OutstandingDebt {
            counterparty_id,
            amount: entry.amount,
            since: entry.owing_since.unwrap_or(entry.first_seen),
        })
        .collect();
    debts.sort_by(|a, b| b.amount.cmp(&a.amount));

    debug!(
        debts = debts.len(),
        unmatched_settlements = unmatched,
        "outstanding debts extracted"
    );
    debts
}

/// Filtering applied to batch reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPolicy {
    /// Debts at or below this amount are not reminded.
    pub minimum_amount: Money,
    /// Maximum number of debts listed per user.
    pub max_entries: usize,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self::from(&ReminderConfig::default())
    }
}

impl From<&ReminderConfig> for ReminderPolicy {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            minimum_amount: config.minimum_amount,
            max_entries: config.max_entries,
        }
    }
}

/// Outstanding debts of one user, ready to be sent as a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReminder {
    /// The debtor being reminded.
    pub user_id: UserId,
    /// Debts above the policy minimum, largest first.
    pub debts: Vec<OutstandingDebt>,
}

/// Runs [`extract_outstanding_debts`] for every user in `users`.
///
/// Users with nothing above `policy.minimum_amount` are left out; each list
/// is truncated to `policy.max_entries`. Output follows the order of `users`.
#[instrument(skip_all, fields(users = users.len()))]
pub fn outstanding_debts_for_all(
    users: &[UserId],
    expenses: &[Expense],
    settlements: &[Settlement],
    policy: &ReminderPolicy,
) -> Vec<UserReminder> {
    let reminders: Vec<UserReminder> = users
        .iter()
        .filter_map(|user| {
            let mut debts: Vec<OutstandingDebt> =
                extract_outstanding_debts(*user, expenses, settlements)
                    .into_iter()
                    .filter(|debt| debt.amount > policy.minimum_amount)
                    .collect();
            debts.truncate(policy.max_entries);
            (!debts.is_empty()).then_some(UserReminder {
                user_id: *user,
                debts,
            })
        })
        .collect();

    debug!(reminders = reminders.len(), "reminder batch prepared");
    reminders
}
