//! Pairwise balance between exactly two users.

use splitr_shared::types::{Money, UserId};
use tracing::{debug, instrument};

use super::error::LedgerError;
use super::settlement::resolve_settlement_edge;
use super::split::edges_for_subject;
use super::types::{Balance, Expense, Settlement};

/// Computes `{owed, owing}` from `subject`'s perspective against `counterparty`.
///
/// Callers pass expenses and settlements relevant to the pair (see
/// [`super::filter`]); edges involving anyone else are ignored.
///
/// Expense edges accumulate first. Each settlement then reduces one side and
/// is clamped at zero on its own: over-payment is absorbed, never carried
/// over into the opposite direction. Because every reduction is a
/// `max(0, x - amount)` with non-negative amounts, the result does not depend
/// on settlement order.
#[instrument(skip_all, fields(subject = %subject, counterparty = %counterparty))]
pub fn pair_balance<'a, 'b, E, S>(
    subject: UserId,
    counterparty: UserId,
    expenses: E,
    settlements: S,
) -> Balance
where
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'b Settlement>,
{
    let mut balance = Balance::default();
    let mut ignored = 0usize;

    for expense in expenses {
        for edge in edges_for_subject(expense, subject) {
            if edge.runs(counterparty, subject) {
                balance.owed += edge.amount;
            } else if edge.runs(subject, counterparty) {
                balance.owing += edge.amount;
            }
        }
    }

    for settlement in settlements {
        let edge = resolve_settlement_edge(settlement);
        if edge.runs(subject, counterparty) {
            balance.owing = balance.owing.clamped_sub(edge.amount);
        } else if edge.runs(counterparty, subject) {
            balance.owed = balance.owed.clamped_sub(edge.amount);
        } else {
            ignored += 1;
        }
    }

    debug!(
        owed = %balance.owed,
        owing = %balance.owing,
        ignored_settlements = ignored,
        "pair balance computed"
    );
    balance
}

/// Signed net balance of `subject` against `counterparty`.
///
/// Positive: the counterparty owes the subject. Negative: the subject owes
/// the counterparty. Zero: settled.
///
/// # Errors
///
/// Returns `LedgerError::SelfPair` when both ids are the same user.
pub fn resolve_pair_balance<'a, 'b, E, S>(
    subject: UserId,
    counterparty: UserId,
    expenses: E,
    settlements: S,
) -> Result<Money, LedgerError>
where
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'b Settlement>,
{
    if subject == counterparty {
        return Err(LedgerError::SelfPair(subject));
    }
    Ok(pair_balance(subject, counterparty, expenses, settlements).net())
}
