//! Split planning using the Largest Remainder Method.
//!
//! Turns an expense total and a split plan into concrete per-user shares
//! whose sum equals the total exactly, so no cent is lost or invented.
//!
//! The Largest Remainder Method works by:
//! 1. Calculate exact shares
//! 2. Round each share toward zero
//! 3. Distribute the leftover units to the shares with the largest
//!    fractional parts, earlier participants first on ties

use std::collections::HashSet;

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use splitr_shared::types::{Money, UserId};

use crate::ledger::error::LedgerError;
use crate::ledger::types::Split;

/// How an expense total is divided among participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "shares", rename_all = "snake_case")]
pub enum SplitPlan {
    /// Everyone pays the same.
    Equal,
    /// One percentage per participant, adding up to 100.
    Percentage(Vec<Decimal>),
    /// One amount per participant, adding up to the total.
    Exact(Vec<Money>),
}

/// Builds one split per participant.
///
/// Shares are rounded to `scale` decimal places and always sum to the total
/// rounded to the same scale. The payer's share, if the payer participates,
/// is marked paid; everyone else's is unpaid.
///
/// # Errors
///
/// Returns an error if the total is not positive, there are no
/// participants, a participant is repeated, or the plan does not fit the
/// participants (wrong share count, percentages not adding to 100, exact
/// amounts not adding to the total, negative shares), or if `scale` is
/// larger than [`Decimal::MAX_SCALE`].
pub fn plan_splits(
    total: Money,
    participants: &[UserId],
    payer: Option<UserId>,
    plan: &SplitPlan,
    scale: u32,
) -> Result<Vec<Split>, LedgerError> {
    if scale > Decimal::MAX_SCALE {
        return Err(LedgerError::UnsupportedScale(scale));
    }
    if !total.is_positive() {
        return Err(LedgerError::NonPositiveAmount(total));
    }
    if participants.is_empty() {
        return Err(LedgerError::EmptySplit);
    }
    let mut seen = HashSet::with_capacity(participants.len());
    if let Some(dup) = participants.iter().find(|u| !seen.insert(**u)) {
        return Err(LedgerError::DuplicateSplitUser(*dup));
    }

    let total = total.round_to(scale).amount();
    let amounts = match plan {
        SplitPlan::Equal => allocate_equal(total, participants.len(), scale),
        SplitPlan::Percentage(percentages) => {
            check_share_count(participants.len(), percentages.len())?;
            let sum: Decimal = percentages.iter().copied().sum();
            if sum != Decimal::ONE_HUNDRED || percentages.iter().any(|p| p.is_sign_negative()) {
                return Err(LedgerError::InvalidPercentages { total: sum });
            }
            allocate_by_percentages(total, percentages, scale)
        }
        SplitPlan::Exact(shares) => {
            check_share_count(participants.len(), shares.len())?;
            let rounded: Vec<Decimal> = shares.iter().map(|s| s.round_to(scale).amount()).collect();
            if let Some((user, amount)) = participants
                .iter()
                .zip(&rounded)
                .find(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
            {
                return Err(LedgerError::NegativeSplitAmount {
                    user: *user,
                    amount: Money::new(*amount),
                });
            }
            let actual: Decimal = rounded.iter().copied().sum();
            if actual != total {
                return Err(LedgerError::SplitSumMismatch {
                    expected: Money::new(total),
                    actual: Money::new(actual),
                });
            }
            rounded
        }
    };

    Ok(participants
        .iter()
        .zip(amounts)
        .map(|(user, amount)| Split {
            user_id: *user,
            amount: Money::new(amount),
            paid: payer == Some(*user),
        })
        .collect())
}

fn check_share_count(expected: usize, actual: usize) -> Result<(), LedgerError> {
    if expected == actual {
        Ok(())
    } else {
        Err(LedgerError::ShareCountMismatch { expected, actual })
    }
}

/// Equal shares; the first `remainder` participants get one extra unit.
fn allocate_equal(total: Decimal, count: usize, scale: u32) -> Vec<Decimal> {
    let unit = Decimal::new(1, scale);
    let count_dec = Decimal::from(count as u64);

    let base = (total / count_dec).round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    let remainder = total - base * count_dec;
    let extra = units(remainder, unit);

    (0..count)
        .map(|i| if i < extra { base + unit } else { base })
        .collect()
}

fn allocate_by_percentages(total: Decimal, percentages: &[Decimal], scale: u32) -> Vec<Decimal> {
    let unit = Decimal::new(1, scale);

    let exact: Vec<Decimal> = percentages
        .iter()
        .map(|p| total * *p / Decimal::ONE_HUNDRED)
        .collect();
    let mut rounded: Vec<Decimal> = exact
        .iter()
        .map(|a| a.round_dp_with_strategy(scale, RoundingStrategy::ToZero))
        .collect();

    let remainder = total - rounded.iter().copied().sum::<Decimal>();
    let extra = units(remainder, unit);
    if extra == 0 {
        return rounded;
    }

    let mut fractions: Vec<(usize, Decimal)> = exact
        .iter()
        .zip(&rounded)
        .enumerate()
        .map(|(i, (e, r))| (i, *e - *r))
        .collect();
    // Stable: ties keep participant order
    fractions.sort_by(|a, b| b.1.cmp(&a.1));

    for (idx, _) in fractions.iter().take(extra) {
        rounded[*idx] += unit;
    }
    rounded
}

fn units(remainder: Decimal, unit: Decimal) -> usize {
    (remainder / unit)
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_usize()
        .unwrap_or(0)
}
