//! Row filters for pairwise queries.

use splitr_shared::types::UserId;

use super::types::{Expense, Settlement};

/// Keeps expenses where both `a` and `b` are payer or split participant.
pub fn expenses_between(
    expenses: &[Expense],
    a: UserId,
    b: UserId,
) -> impl Iterator<Item = &Expense> {
    expenses
        .iter()
        .filter(move |e| e.involves(a) && e.involves(b))
}

/// Keeps settlements whose endpoints are exactly `a` and `b`, either direction.
pub fn settlements_between(
    settlements: &[Settlement],
    a: UserId,
    b: UserId,
) -> impl Iterator<Item = &Settlement> {
    settlements.iter().filter(move |s| s.is_between(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Split;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use splitr_shared::types::{ExpenseId, Money, SettlementId};

    fn expense(paid_by: UserId, participants: &[UserId]) -> Expense {
        Expense {
            id: ExpenseId::new(),
            description: String::new(),
            amount: Money::new(dec!(10)),
            paid_by,
            group_id: None,
            category: None,
            date: Utc::now(),
            splits: participants
                .iter()
                .map(|u| Split::unpaid(*u, Money::new(dec!(5))))
                .collect(),
        }
    }

    #[test]
    fn test_expenses_between_requires_both_users() {
        let a = UserId::new();
        let b = UserId::new();
        let c = UserId::new();
        let expenses = vec![
            expense(a, &[b]),
            expense(c, &[a, b]),
            expense(a, &[c]),
            expense(c, &[b]),
        ];

        let kept: Vec<_> = expenses_between(&expenses, a, b).map(|e| e.id).collect();
        assert_eq!(kept, vec![expenses[0].id, expenses[1].id]);
    }

    #[test]
    fn test_settlements_between_matches_either_direction() {
        let a = UserId::new();
        let b = UserId::new();
        let c = UserId::new();
        let make = |paid_by, received_by| Settlement {
            id: SettlementId::new(),
            amount: Money::new(dec!(1)),
            paid_by,
            received_by,
            group_id: None,
            date: Utc::now(),
            note: None,
        };
        let settlements = vec![make(a, b), make(b, a), make(a, c)];

        assert_eq!(settlements_between(&settlements, a, b).count(), 2);
        assert_eq!(settlements_between(&settlements, b, c).count(), 0);
    }
}
