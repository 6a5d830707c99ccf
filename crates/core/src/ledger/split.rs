//! Split resolution: the debt edges an expense implies.

use splitr_shared::types::UserId;

use super::types::{DebtEdge, Expense};

/// Returns every debt edge of an expense.
///
/// Each unpaid split that does not belong to the payer becomes
/// `split.user_id -> paid_by`. Paid splits and the payer's own split never
/// produce an edge.
pub fn resolve_expense_edges(expense: &Expense) -> impl Iterator<Item = DebtEdge> + '_ {
    expense
        .splits
        .iter()
        .filter(move |split| !split.paid && split.user_id != expense.paid_by)
        .map(move |split| DebtEdge {
            debtor: split.user_id,
            creditor: expense.paid_by,
            amount: split.amount,
        })
}

/// Returns the edges of an expense as seen by `subject`.
///
/// - Subject paid: every edge of the expense.
/// - Someone else paid: the subject's own unpaid share owed to the payer, or
///   nothing when the subject's share is paid or absent.
#[must_use]
pub fn edges_for_subject(expense: &Expense, subject: UserId) -> Vec<DebtEdge> {
    if expense.paid_by == subject {
        return resolve_expense_edges(expense).collect();
    }

    expense
        .unpaid_share_of(subject)
        .map(|amount| DebtEdge {
            debtor: subject,
            creditor: expense.paid_by,
            amount,
        })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Split;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use splitr_shared::types::{ExpenseId, Money};

    fn money(v: Decimal) -> Money {
        Money::new(v)
    }

    fn expense(paid_by: UserId, splits: Vec<Split>) -> Expense {
        Expense {
            id: ExpenseId::new(),
            description: "Groceries".to_string(),
            amount: splits.iter().map(|s| s.amount).sum(),
            paid_by,
            group_id: None,
            category: None,
            date: Utc::now(),
            splits,
        }
    }

    #[test]
    fn test_payer_sees_every_unpaid_share() {
        let a = UserId::new();
        let b = UserId::new();
        let c = UserId::new();
        let exp = expense(
            a,
            vec![
                Split::paid(a, money(dec!(100))),
                Split::unpaid(b, money(dec!(100))),
                Split::unpaid(c, money(dec!(100))),
            ],
        );

        let edges = edges_for_subject(&exp, a);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.creditor == a));
        assert!(edges.iter().any(|e| e.runs(b, a) && e.amount == money(dec!(100))));
        assert!(edges.iter().any(|e| e.runs(c, a) && e.amount == money(dec!(100))));
    }

    #[test]
    fn test_participant_sees_only_own_share() {
        let a = UserId::new();
        let b = UserId::new();
        let c = UserId::new();
        let exp = expense(
            a,
            vec![
                Split::unpaid(b, money(dec!(40))),
                Split::unpaid(c, money(dec!(60))),
            ],
        );

        let edges = edges_for_subject(&exp, b);
        assert_eq!(
            edges,
            vec![DebtEdge {
                debtor: b,
                creditor: a,
                amount: money(dec!(40)),
            }]
        );
    }

    #[test]
    fn test_paid_share_produces_nothing() {
        let a = UserId::new();
        let b = UserId::new();
        let exp = expense(a, vec![Split::paid(b, money(dec!(75)))]);

        assert!(edges_for_subject(&exp, b).is_empty());
        assert!(edges_for_subject(&exp, a).is_empty());
        assert_eq!(resolve_expense_edges(&exp).count(), 0);
    }

    #[test]
    fn test_absent_subject_produces_nothing() {
        let a = UserId::new();
        let b = UserId::new();
        let outsider = UserId::new();
        let exp = expense(a, vec![Split::unpaid(b, money(dec!(10)))]);

        assert!(edges_for_subject(&exp, outsider).is_empty());
    }

    #[test]
    fn test_payer_only_expense_has_no_edges() {
        let a = UserId::new();
        let exp = expense(a, vec![Split::paid(a, money(dec!(20)))]);

        assert_eq!(resolve_expense_edges(&exp).count(), 0);
        assert!(edges_for_subject(&exp, a).is_empty());
    }

    #[test]
    fn test_unpaid_payer_split_is_still_excluded() {
        // A user cannot owe themselves even if the split is not flagged paid
        let a = UserId::new();
        let b = UserId::new();
        let exp = expense(
            a,
            vec![
                Split::unpaid(a, money(dec!(50))),
                Split::unpaid(b, money(dec!(50))),
            ],
        );

        let edges: Vec<_> = resolve_expense_edges(&exp).collect();
        assert_eq!(edges.len(), 1);
        assert!(edges[0].runs(b, a));
    }
}
