//! JSON snapshot of the rows the engine reads.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use splitr_core::ledger::{Expense, Settlement, validate_expense, validate_settlement};
use splitr_shared::types::{GroupId, UserId};
use splitr_shared::{AppError, AppResult};
use tracing::{debug, warn};

/// A user known to the snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
}

/// A group and its members.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    /// Group ID.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Member IDs.
    pub members: Vec<UserId>,
}

/// Every row needed to produce a report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    /// Users.
    #[serde(default)]
    pub users: Vec<UserRecord>,
    /// Groups.
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    /// Expenses with their splits.
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Settlements.
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

impl Snapshot {
    /// Reads a snapshot from a JSON file.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses a snapshot from JSON text.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw).map_err(|e| AppError::Validation(format!("invalid snapshot: {e}")))
    }

    /// Drops rows that would be rejected on the write path.
    ///
    /// Returns the number of rows dropped. Each dropped row is logged.
    pub fn retain_valid(&mut self, tolerance: Decimal) -> usize {
        let members: HashMap<GroupId, Vec<UserId>> = self
            .groups
            .iter()
            .map(|g| (g.id, g.members.clone()))
            .collect();
        let before = self.expenses.len() + self.settlements.len();

        self.expenses.retain(|expense| match validate_expense(expense, tolerance) {
            Ok(()) => true,
            Err(err) => {
                warn!(expense_id = %expense.id, code = err.error_code(), error = %err, "dropping invalid expense");
                false
            }
        });

        self.settlements.retain(|settlement| {
            let group_members = settlement
                .group_id
                .and_then(|id| members.get(&id))
                .map(Vec::as_slice);
            match validate_settlement(settlement, group_members) {
                Ok(()) => true,
                Err(err) => {
                    warn!(settlement_id = %settlement.id, code = err.error_code(), error = %err, "dropping invalid settlement");
                    false
                }
            }
        });

        let dropped = before - self.expenses.len() - self.settlements.len();
        debug!(
            expenses = self.expenses.len(),
            settlements = self.settlements.len(),
            dropped,
            "snapshot validated"
        );
        dropped
    }

    /// Display name of a user, `"Unknown"` if absent.
    pub fn user_name(&self, id: UserId) -> &str {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map_or("Unknown", |u| u.name.as_str())
    }

    /// Returns true if the user is listed.
    pub fn has_user(&self, id: UserId) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    /// Expenses outside any group.
    pub fn personal_expenses(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(|e| e.group_id.is_none())
    }

    /// Settlements outside any group.
    pub fn personal_settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter().filter(|s| s.group_id.is_none())
    }

    /// Expenses of one group.
    pub fn group_expenses(&self, group: GroupId) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(move |e| e.group_id == Some(group))
    }

    /// Settlements of one group.
    pub fn group_settlements(&self, group: GroupId) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter().filter(move |s| s.group_id == Some(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ALICE: &str = "01936f0e-0000-7000-8000-000000000001";
    const BOB: &str = "01936f0e-0000-7000-8000-000000000002";
    const TRIP: &str = "01936f0e-0000-7000-8000-0000000000aa";

    fn sample() -> String {
        format!(
            r#"{{
  "users": [{{"id": "{ALICE}", "name": "Alice"}}, {{"id": "{BOB}", "name": "Bob"}}],
  "groups": [{{"id": "{TRIP}", "name": "Trip", "members": ["{ALICE}", "{BOB}"]}}],
  "expenses": [
    {{"id": "01936f0e-0000-7000-8000-000000000101", "amount": "60.00", "paid_by": "{ALICE}",
      "group_id": "{TRIP}", "date": "2026-03-01T10:00:00Z",
      "splits": [{{"user_id": "{ALICE}", "amount": "30.00", "paid": true}}, {{"user_id": "{BOB}", "amount": "30.00"}}]}},
    {{"id": "01936f0e-0000-7000-8000-000000000102", "amount": "50.00", "paid_by": "{BOB}",
      "date": "2026-03-02T10:00:00Z",
      "splits": [{{"user_id": "{ALICE}", "amount": "20.00"}}]}}
  ],
  "settlements": [
    {{"id": "01936f0e-0000-7000-8000-000000000201", "amount": "10.00", "paid_by": "{BOB}",
      "received_by": "{ALICE}", "group_id": "{TRIP}", "date": "2026-03-03T10:00:00Z"}},
    {{"id": "01936f0e-0000-7000-8000-000000000202", "amount": "5.00", "paid_by": "{BOB}",
      "received_by": "{BOB}", "date": "2026-03-03T10:00:00Z"}}
  ]
}}"#
        )
    }

    #[test]
    fn test_parse_and_partition() {
        let snapshot = Snapshot::from_json(&sample()).unwrap();
        let trip: GroupId = TRIP.parse().unwrap();

        assert_eq!(snapshot.users.len(), 2);
        assert_eq!(snapshot.group_expenses(trip).count(), 1);
        assert_eq!(snapshot.personal_expenses().count(), 1);
        assert_eq!(snapshot.group_settlements(trip).count(), 1);
        assert_eq!(snapshot.user_name(ALICE.parse().unwrap()), "Alice");
        assert_eq!(snapshot.user_name(UserId::new()), "Unknown");
    }

    #[test]
    fn test_retain_valid_drops_bad_rows() {
        let mut snapshot = Snapshot::from_json(&sample()).unwrap();

        let dropped = snapshot.retain_valid(dec!(0.01));

        // The personal expense splits 20 of 50; the self-settlement is invalid
        assert_eq!(dropped, 2);
        assert_eq!(snapshot.expenses.len(), 1);
        assert_eq!(snapshot.settlements.len(), 1);
    }

    #[test]
    fn test_invalid_json_is_validation_error() {
        let err = Snapshot::from_json("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
