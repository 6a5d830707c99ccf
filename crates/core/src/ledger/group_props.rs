//! Property-based tests for the group ledger.
//!
//! - Property 1: Conservation of totals
//! - Property 2: Netting idempotence
//! - Property 3: Input order independence
//! - Property 4: Group position agrees with running totals

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use splitr_shared::types::{ExpenseId, GroupId, Money, SettlementId, UserId};

use super::group::GroupLedger;
use super::types::{Expense, Settlement, Split};
use super::view::group_position;

/// Number of group members; one extra user outside the group is also generated.
const MEMBERS: usize = 4;

/// Raw expense: payer index and, per user, `(participates, cents, paid)`.
type ExpenseSpec = (usize, Vec<(bool, i64, bool)>);
/// Raw settlement: payer index, receiver index, cents.
type SettlementSpec = (usize, usize, i64);

/// Strategy for expenses over users `0..users`.
fn expense_specs(users: usize) -> impl Strategy<Value = Vec<ExpenseSpec>> {
    prop::collection::vec(
        (
            0..users,
            prop::collection::vec((any::<bool>(), 1i64..100_000i64, any::<bool>()), users),
        ),
        0..12,
    )
}

/// Strategy for settlements over users `0..users`, payer and receiver distinct.
fn settlement_specs(users: usize) -> impl Strategy<Value = Vec<SettlementSpec>> {
    prop::collection::vec(
        (0..users, 0..users, 1i64..100_000i64).prop_filter("distinct parties", |(p, r, _)| p != r),
        0..8,
    )
}

fn users() -> Vec<UserId> {
    (0..=MEMBERS).map(|_| UserId::new()).collect()
}

fn build_rows(
    users: &[UserId],
    expenses: &[ExpenseSpec],
    settlements: &[SettlementSpec],
) -> (Vec<Expense>, Vec<Settlement>) {
    let group = GroupId::new();
    let date = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();

    let expenses = expenses
        .iter()
        .map(|(payer, shares)| {
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
                group_id: Some(group),
                category: None,
                date,
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
            group_id: Some(group),
            date,
            note: None,
        })
        .collect();

    (expenses, settlements)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1.1: Totals always sum to zero.
    ///
    /// *For any* rows, including ones that reference a user outside the
    /// member set, the sum of every member's running total SHALL be zero.
    #[test]
    fn prop_totals_conserved(
        expense_rows in expense_specs(MEMBERS + 1),
        settlement_rows in settlement_specs(MEMBERS + 1),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let ledger = GroupLedger::build(users[..MEMBERS].iter().copied(), &expenses, &settlements);

        prop_assert_eq!(ledger.totals_sum(), Money::ZERO);
    }

    /// Property 2.1: Netting twice changes nothing.
    ///
    /// *For any* built ledger, at most one direction per pair SHALL be
    /// non-zero, and a second netting pass SHALL leave every cell unchanged.
    #[test]
    fn prop_netting_idempotent(
        expense_rows in expense_specs(MEMBERS),
        settlement_rows in settlement_specs(MEMBERS),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let mut ledger = GroupLedger::build(users[..MEMBERS].iter().copied(), &expenses, &settlements);
        prop_assert!(ledger.is_netted());

        let once = ledger.member_balances();
        ledger.net();
        prop_assert_eq!(ledger.member_balances(), once);
    }

    /// Property 2.2: A member never both owes and is owed by the same member.
    #[test]
    fn prop_owes_and_owed_by_disjoint(
        expense_rows in expense_specs(MEMBERS),
        settlement_rows in settlement_specs(MEMBERS),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let ledger = GroupLedger::build(users[..MEMBERS].iter().copied(), &expenses, &settlements);

        for balance in ledger.member_balances() {
            for owes in &balance.owes {
                prop_assert!(owes.amount.is_positive());
                prop_assert!(balance.owed_by.iter().all(|o| o.from != owes.to));
            }
        }
    }

    /// Property 3.1: Row order does not matter.
    ///
    /// *For any* rows, reversing expenses and settlements SHALL produce the
    /// same per-member balances.
    #[test]
    fn prop_order_independent(
        expense_rows in expense_specs(MEMBERS + 1),
        settlement_rows in settlement_specs(MEMBERS + 1),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let forward = GroupLedger::build(users[..MEMBERS].iter().copied(), &expenses, &settlements);
        let backward = GroupLedger::build(
            users[..MEMBERS].iter().copied(),
            expenses.iter().rev(),
            settlements.iter().rev(),
        );

        prop_assert_eq!(forward.member_balances(), backward.member_balances());
    }

    /// Property 4.1: Group position equals the ledger's running total.
    #[test]
    fn prop_group_position_matches_totals(
        expense_rows in expense_specs(MEMBERS),
        settlement_rows in settlement_specs(MEMBERS),
    ) {
        let users = users();
        let (expenses, settlements) = build_rows(&users, &expense_rows, &settlement_rows);

        let ledger = GroupLedger::build(users[..MEMBERS].iter().copied(), &expenses, &settlements);

        for member in &users[..MEMBERS] {
            prop_assert_eq!(
                Some(group_position(*member, &expenses, &settlements)),
                ledger.total_balance(*member)
            );
        }
    }

    /// Property 4.2: Paid splits contribute nothing.
    ///
    /// *For any* rows, changing the amount of every paid split SHALL leave
    /// the ledger unchanged.
    #[test]
    fn prop_paid_splits_excluded(
        expense_rows in expense_specs(MEMBERS),
        replacement in 1i64..1_000_000i64,
    ) {
        let users = users();
        let (expenses, _) = build_rows(&users, &expense_rows, &[]);
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
        let no_settlements: &[Settlement] = &[];

        let base = GroupLedger::build(users[..MEMBERS].iter().copied(), &expenses, no_settlements);
        let other = GroupLedger::build(users[..MEMBERS].iter().copied(), &inflated, no_settlements);

        prop_assert_eq!(base.member_balances(), other.member_balances());
    }
}
