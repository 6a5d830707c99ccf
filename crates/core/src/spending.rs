//! Spending statistics for one user.
//!
//! A user's spending is their own share of each expense, paid or not.
//! Expenses the user paid for others but has no share in count as zero.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use splitr_shared::types::{Money, UserId};

use crate::ledger::types::Expense;

/// Category used for expenses without one.
pub const UNCATEGORISED: &str = "other";

/// Spending within one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySpending {
    /// Month number, 1 to 12.
    pub month: u32,
    /// Subject's share spent that month.
    pub total: Money,
}

/// Spending within one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Lowercased category name.
    pub category: String,
    /// Subject's share spent in the category.
    pub total: Money,
}

fn share(expense: &Expense, subject: UserId) -> Option<Money> {
    expense.share_of(subject).map(|split| split.amount)
}

/// Sum of `subject`'s shares on expenses dated at or after `since`.
pub fn total_spent<'a, E>(subject: UserId, expenses: E, since: DateTime<Utc>) -> Money
where
    E: IntoIterator<Item = &'a Expense>,
{
    expenses
        .into_iter()
        .filter(|e| e.date >= since)
        .filter_map(|e| share(e, subject))
        .sum()
}

/// Twelve zero-filled monthly buckets of `subject`'s shares in `year`.
pub fn monthly_spending<'a, E>(subject: UserId, expenses: E, year: i32) -> Vec<MonthlySpending>
where
    E: IntoIterator<Item = &'a Expense>,
{
    let mut buckets: Vec<MonthlySpending> = (1..=12)
        .map(|month| MonthlySpending {
            month,
            total: Money::ZERO,
        })
        .collect();

    for expense in expenses.into_iter().filter(|e| e.date.year() == year) {
        if let Some(amount) = share(expense, subject) {
            buckets[expense.date.month0() as usize].total += amount;
        }
    }
    buckets
}

/// `subject`'s shares grouped by category, largest first.
///
/// Category names are trimmed and lowercased; blank or missing categories
/// fall under [`UNCATEGORISED`]. Ties keep first-seen order.
pub fn category_totals<'a, E>(subject: UserId, expenses: E) -> Vec<CategoryTotal>
where
    E: IntoIterator<Item = &'a Expense>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for expense in expenses {
        let Some(amount) = share(expense, subject) else {
            continue;
        };
        let category = expense
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map_or_else(|| UNCATEGORISED.to_string(), str::to_lowercase);

        match positions.get(&category) {
            Some(index) => totals[*index].total += amount,
            None => {
                positions.insert(category.clone(), totals.len());
                totals.push(CategoryTotal {
                    category,
                    total: amount,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}
