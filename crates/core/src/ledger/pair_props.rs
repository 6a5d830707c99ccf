//! Property-based tests for pairwise and per-user balances.
//!
//! - Property 5: Pair symmetry
//! - Property 6: Settlement clamping
//! - Property 7: Paid-split exclusion
//! - Property 8: Aggregate lists agree with totals

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use splitr_shared::types::{ExpenseId, Money, SettlementId, UserId};

use super::debts::{extract_outstanding_debts, resolve_user_balances};
use super::pair::{pair_balance, resolve_pair_balance};
use super::types::{Expense, Settlement, Split};

/// Users 0 and 1 are the pair under test, 2 is a bystander.
const USERS: usize = 3;

type ExpenseSpec = (usize, Vec<(bool, i64, bool)>, u32);
type SettlementSpec = (usize, usize, i64);

/// Strategy to generate expenses with unique participants per expense.
fn expense_specs() -> impl Strategy<Value = Vec<ExpenseSpec>> {
    prop::collection::vec(
        (
            0..USERS,
            prop::collection::vec((any::<bool>(), 1i64..100_000i64, any::<bool>()), USERS),
            1u32..28,
        ),
        0..10,
    )
}

/// Strategy to generate settlements between distinct users.
fn settlement_specs() -> impl Strategy<Value = Vec<SettlementSpec>> {
    prop::collection::vec(
        (0..USERS, 0..USERS, 1i64..200_000i64).prop_filter("distinct parties", |(p, r, _)| p != r),
        0..6,
    )
}

fn build_rows(
    users: &[UserId],
    expenses: &[ExpenseSpec],
    settlements: &[SettlementSpec],
) -> (Vec<Expense>, Vec<Settlement>) {
    let expenses = expenses
        .iter()
        .map(|(payer, shares, day)| {
            let splits: Vec<Split> = shares
                .iter()
                .enumerate()
                .filter(|(_, (participates, _, _))| *participates)
                .map(|(i, (_, cents, paid))| Split {
                    user_id: users[i],
                    amount: Money::new(Decimal::new(*cents, 2)),
                    paid: *paid,
                })
                .collect();
            Expense {
                id: ExpenseId::new(),
                description: String::new(),
                amount: splits.iter().map(|s| s.amount).sum(),
                paid_by: users[*payer],
                group_id: None,
                category: None,
                date: Utc.with_ymd_and_hms(2026, 2, *day, 9, 0, 0).unwrap(),
                splits,
            }
        })
        .collect();

    let settlements = settlements
        .iter()
        .map(|(payer, receiver, cents)| Settlement {
            id: SettlementId::new(),
            amount: Money::new(Decimal::new(*cents, 2)),
            paid_by: users[*payer],
            received_by: users[*receiver],
            group_id: None,
            date: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            note: None,
        })
        .collect();

    (expenses, settlements)
}

fn users() -> Vec<UserId> {
    (0..USERS).map(|_| UserId::new()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 5.1: `resolve_pair_balance(a, b) == -resolve_pair_balance(b, a)`.
    #[test]
    fn prop_pair_symmetry(
        expense_rows in expense_specs(),
        settlement_rows in settlement_specs(),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);
        let (a, b) = (users[0], users[1]);

        let ab = resolve_pair_balance(a, b, &expenses, &settlements).unwrap();
        let ba = resolve_pair_balance(b, a, &expenses, &settlements).unwrap();

        prop_assert_eq!(ab, -ba);
    }

    /// Property 6.1: Settlements never drive either side negative.
    #[test]
    fn prop_settlement_clamping(
        expense_rows in expense_specs(),
        settlement_rows in settlement_specs(),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let balance = pair_balance(users[0], users[1], &expenses, &settlements);

        prop_assert!(!balance.owed.is_negative());
        prop_assert!(!balance.owing.is_negative());
    }

    /// Property 6.2: Settlement order does not matter.
    #[test]
    fn prop_settlement_order_independent(
        expense_rows in expense_specs(),
        settlement_rows in settlement_specs(),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let forward = pair_balance(users[0], users[1], &expenses, &settlements);
        let backward = pair_balance(users[0], users[1], expenses.iter().rev(), settlements.iter().rev());

        prop_assert_eq!(forward, backward);
    }

    /// Property 7.1: Changing paid split amounts changes no balance.
    #[test]
    fn prop_paid_splits_excluded(
        expense_rows in expense_specs(),
        settlement_rows in settlement_specs(),
        replacement in 1i64..1_000_000i64,
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);
        let inflated: Vec<Expense> = expenses
            .iter()
            .cloned()
            .map(|mut e| {
                for split in e.splits.iter_mut().filter(|s| s.paid) {
                    split.amount = Money::new(Decimal::new(replacement, 2));
                }
                e
            })
            .collect();

        prop_assert_eq!(
            pair_balance(users[0], users[1], &expenses, &settlements),
            pair_balance(users[0], users[1], &inflated, &settlements)
        );
        prop_assert_eq!(
            resolve_user_balances(users[0], &expenses, &settlements),
            resolve_user_balances(users[0], &inflated, &settlements)
        );
    }

    /// Property 8.1: Per-counterparty lists add up to the total balance.
    ///
    /// *For any* rows, `total_balance` SHALL equal the sum of the
    /// "owed by" list minus the sum of the "you owe" list, and every listed
    /// amount SHALL be strictly positive.
    #[test]
    fn prop_user_lists_match_total(
        expense_rows in expense_specs(),
        settlement_rows in settlement_specs(),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let balances = resolve_user_balances(users[0], &expenses, &settlements);
        let details = &balances.owe_details;
        let owed_by: Money = details.you_are_owed_by.iter().map(|e| e.amount).sum();
        let owe: Money = details.you_owe.iter().map(|e| e.amount).sum();

        prop_assert_eq!(balances.total_balance, owed_by - owe);
        prop_assert!(details.you_owe.iter().chain(&details.you_are_owed_by).all(|e| e.amount.is_positive()));
        prop_assert!(details.you_owe.windows(2).all(|w| w[0].amount >= w[1].amount));
    }

    /// Property 8.2: Outstanding debts are positive and sorted largest first.
    #[test]
    fn prop_outstanding_debts_sorted_positive(
        expense_rows in expense_specs(),
        settlement_rows in settlement_specs(),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let debts = extract_outstanding_debts(users[0], &expenses, &settlements);

        prop_assert!(debts.iter().all(|d| d.amount.is_positive() && d.counterparty_id != users[0]));
        prop_assert!(debts.windows(2).all(|w| w[0].amount >= w[1].amount));
    }
}
