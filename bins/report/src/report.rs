//! Report assembly: runs the engine over a snapshot and shapes the output.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use splitr_core::ledger::{
    BalanceStatus, CounterpartyAmount, Expense, GroupLedger, ReminderPolicy, Settlement,
    SettlementTarget, SettlementView, expenses_between, group_position,
    outstanding_debts_for_all, resolve_user_balances, settlement_view, settlements_between,
};
use splitr_core::spending::{CategoryTotal, MonthlySpending, category_totals, monthly_spending, total_spent};
use splitr_shared::types::{Currency, GroupId, Money, UserId};
use splitr_shared::{AppConfig, AppError, AppResult};
use tracing::{info, instrument};

use crate::snapshot::{GroupRecord, Snapshot};

/// An amount with its display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Amount {
    /// Amount rounded to the display scale.
    pub value: Money,
    /// Formatted with the configured currency.
    pub display: String,
}

/// A counterparty line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    /// The other user.
    pub user_id: UserId,
    /// Their display name.
    pub name: String,
    /// Amount.
    pub amount: Amount,
}

/// One member of a group report.
#[derive(Debug, Clone, Serialize)]
pub struct MemberReport {
    /// Member ID.
    pub member_id: UserId,
    /// Display name.
    pub name: String,
    /// Net position in the group.
    pub total_balance: Amount,
    /// Who this member owes.
    pub owes: Vec<Line>,
    /// Who owes this member.
    pub owed_by: Vec<Line>,
}

/// Netted ledger of one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    /// Group ID.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
    /// Rows referencing users outside the group.
    pub skipped_edges: usize,
    /// Per-member lines.
    pub members: Vec<MemberReport>,
}

/// One reminded debt.
#[derive(Debug, Clone, Serialize)]
pub struct DebtLine {
    /// Creditor.
    pub user_id: UserId,
    /// Creditor name.
    pub name: String,
    /// Amount owed.
    pub amount: Amount,
    /// Outstanding since.
    pub since: DateTime<Utc>,
}

/// Reminder for one debtor.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderReport {
    /// Debtor.
    pub user_id: UserId,
    /// Debtor name.
    pub name: String,
    /// Debts, largest first.
    pub debts: Vec<DebtLine>,
}

/// The subject's position in one of their groups.
#[derive(Debug, Clone, Serialize)]
pub struct GroupLine {
    /// Group ID.
    pub group_id: GroupId,
    /// Group name.
    pub name: String,
    /// Signed position.
    pub position: Amount,
    /// Direction of `position`.
    pub status: BalanceStatus,
}

/// Everything the dashboard shows for one user.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Subject.
    pub user_id: UserId,
    /// Subject name.
    pub name: String,
    /// Total the subject owes.
    pub you_owe: Amount,
    /// Total owed to the subject.
    pub you_are_owed: Amount,
    /// Net.
    pub total_balance: Amount,
    /// Direction of `total_balance`.
    pub status: BalanceStatus,
    /// Counterparties the subject owes.
    pub owe: Vec<Line>,
    /// Counterparties who owe the subject.
    pub owed_by: Vec<Line>,
    /// Spent since January 1st.
    pub total_spent: Amount,
    /// Spending per month this year.
    pub monthly: Vec<MonthlySpending>,
    /// Spending per category.
    pub categories: Vec<CategoryTotal>,
    /// Position in each group.
    pub groups: Vec<GroupLine>,
    /// Settle-up views against counterparties and groups.
    pub settle_up: Vec<SettlementView>,
}

/// Full report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Display currency.
    pub currency: Currency,
    /// Group ledgers.
    pub groups: Vec<GroupReport>,
    /// Debt reminders over personal expenses.
    pub reminders: Vec<ReminderReport>,
    /// Dashboard of the requested user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<Dashboard>,
}

struct Formatter<'s> {
    currency: Currency,
    scale: u32,
    snapshot: &'s Snapshot,
}

impl Formatter<'_> {
    fn amount(&self, value: Money) -> Amount {
        let value = value.round_to(self.scale);
        Amount {
            value,
            display: value.format_with(self.currency),
        }
    }

    fn line(&self, user_id: UserId, amount: Money) -> Line {
        Line {
            user_id,
            name: self.snapshot.user_name(user_id).to_string(),
            amount: self.amount(amount),
        }
    }

    fn lines(&self, entries: &[CounterpartyAmount]) -> Vec<Line> {
        entries
            .iter()
            .map(|e| self.line(e.counterparty_id, e.amount))
            .collect()
    }
}

/// Builds the report. `subject` adds a dashboard for that user.
///
/// # Errors
///
/// Returns `AppError::NotFound` when `subject` is not in the snapshot.
#[instrument(skip_all, fields(subject = ?subject))]
pub fn build_report(
    snapshot: &Snapshot,
    subject: Option<UserId>,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> AppResult<Report> {
    let fmt = Formatter {
        currency: config.ledger.currency,
        scale: config.ledger.display_scale,
        snapshot,
    };
    let personal_expenses: Vec<Expense> = snapshot.personal_expenses().cloned().collect();
    let personal_settlements: Vec<Settlement> = snapshot.personal_settlements().cloned().collect();

    let groups: Vec<GroupReport> = snapshot
        .groups
        .iter()
        .map(|group| group_report(snapshot, group, &fmt))
        .collect();

    let users: Vec<UserId> = snapshot.users.iter().map(|u| u.id).collect();
    let policy = ReminderPolicy::from(&config.reminders);
    let reminders: Vec<ReminderReport> =
        outstanding_debts_for_all(&users, &personal_expenses, &personal_settlements, &policy)
            .into_iter()
            .map(|reminder| ReminderReport {
                user_id: reminder.user_id,
                name: snapshot.user_name(reminder.user_id).to_string(),
                debts: reminder
                    .debts
                    .iter()
                    .map(|debt| DebtLine {
                        user_id: debt.counterparty_id,
                        name: snapshot.user_name(debt.counterparty_id).to_string(),
                        amount: fmt.amount(debt.amount),
                        since: debt.since,
                    })
                    .collect(),
            })
            .collect();

    let dashboard = match subject {
        Some(subject) => Some(build_dashboard(
            snapshot,
            subject,
            &personal_expenses,
            &personal_settlements,
            &fmt,
            now,
        )?),
        None => None,
    };

    info!(
        groups = groups.len(),
        reminders = reminders.len(),
        dashboard = dashboard.is_some(),
        "report built"
    );

    Ok(Report {
        currency: config.ledger.currency,
        groups,
        reminders,
        dashboard,
    })
}

fn group_report(snapshot: &Snapshot, group: &GroupRecord, fmt: &Formatter<'_>) -> GroupReport {
    let ledger = GroupLedger::build(
        group.members.iter().copied(),
        snapshot.group_expenses(group.id),
        snapshot.group_settlements(group.id),
    );

    let members = ledger
        .member_balances()
        .into_iter()
        .map(|balance| MemberReport {
            member_id: balance.member_id,
            name: snapshot.user_name(balance.member_id).to_string(),
            total_balance: fmt.amount(balance.total_balance),
            owes: balance.owes.iter().map(|o| fmt.line(o.to, o.amount)).collect(),
            owed_by: balance.owed_by.iter().map(|o| fmt.line(o.from, o.amount)).collect(),
        })
        .collect();

    GroupReport {
        group_id: group.id,
        name: group.name.clone(),
        skipped_edges: ledger.skipped_edges(),
        members,
    }
}

fn build_dashboard(
    snapshot: &Snapshot,
    subject: UserId,
    personal_expenses: &[Expense],
    personal_settlements: &[Settlement],
    fmt: &Formatter<'_>,
    now: DateTime<Utc>,
) -> AppResult<Dashboard> {
    if !snapshot.has_user(subject) {
        return Err(AppError::NotFound(format!("user {subject}")));
    }

    let balances = resolve_user_balances(subject, personal_expenses, personal_settlements);

    let start_of_year = Utc
        .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Internal(format!("no start of year for {now}")))?;

    let mut groups = Vec::new();
    let mut settle_up = Vec::new();

    let counterparties = balances
        .owe_details
        .you_owe
        .iter()
        .chain(&balances.owe_details.you_are_owed_by)
        .map(|e| e.counterparty_id);
    for counterparty in counterparties {
        settle_up.push(settlement_view(
            subject,
            SettlementTarget::User(counterparty),
            expenses_between(personal_expenses, subject, counterparty),
            settlements_between(personal_settlements, subject, counterparty),
        )?);
    }

    for group in snapshot.groups.iter().filter(|g| g.members.contains(&subject)) {
        let position = group_position(
            subject,
            snapshot.group_expenses(group.id),
            snapshot.group_settlements(group.id),
        );
        groups.push(GroupLine {
            group_id: group.id,
            name: group.name.clone(),
            position: fmt.amount(position),
            status: BalanceStatus::from_net(position),
        });
        settle_up.push(settlement_view(
            subject,
            SettlementTarget::Group {
                group: group.id,
                members: &group.members,
            },
            snapshot.group_expenses(group.id),
            snapshot.group_settlements(group.id),
        )?);
    }

    Ok(Dashboard {
        user_id: subject,
        name: snapshot.user_name(subject).to_string(),
        you_owe: fmt.amount(balances.you_owe),
        you_are_owed: fmt.amount(balances.you_are_owed),
        total_balance: fmt.amount(balances.total_balance),
        status: BalanceStatus::from_net(balances.total_balance),
        owe: fmt.lines(&balances.owe_details.you_owe),
        owed_by: fmt.lines(&balances.owe_details.you_are_owed_by),
        total_spent: fmt.amount(total_spent(subject, &snapshot.expenses, start_of_year)),
        monthly: monthly_spending(subject, &snapshot.expenses, now.year()),
        categories: category_totals(subject, &snapshot.expenses),
        groups,
        settle_up,
    })
}
