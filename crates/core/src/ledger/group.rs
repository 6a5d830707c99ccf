//! Group ledger: the full pairwise debt matrix of a member set.
//!
//! Members are mapped to dense indices once per build and the matrix lives
//! in a flat `Vec`, cell `debtor * n + creditor`. Alongside the matrix, each
//! member carries a running `total` that is updated independently of it and
//! always sums to zero across the group.
//!
//! Edges that reference an id outside the member set are skipped and logged
//! instead of failing the whole computation: one malformed historical row
//! must not hide every other balance in the group. Skipped edges touch
//! neither the matrix nor the totals, so conservation still holds.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use splitr_shared::types::{Money, UserId};
use tracing::{debug, instrument, warn};

use super::settlement::resolve_settlement_edge;
use super::split::resolve_expense_edges;
use super::types::{DebtEdge, Expense, Settlement};

/// Stable mapping between member ids and dense matrix indices.
#[derive(Debug, Clone, Default)]
pub struct MemberIndex {
    members: Vec<UserId>,
    positions: HashMap<UserId, usize>,
}

impl MemberIndex {
    /// Builds the index. Duplicate ids keep their first position.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = UserId>,
    {
        let mut index = Self::default();
        for member in members {
            if !index.positions.contains_key(&member) {
                index.positions.insert(member, index.members.len());
                index.members.push(member);
            }
        }
        index
    }

    /// Position of `member`, if present.
    #[must_use]
    pub fn position(&self, member: UserId) -> Option<usize> {
        self.positions.get(&member).copied()
    }

    /// Returns true if `member` is in the set.
    #[must_use]
    pub fn contains(&self, member: UserId) -> bool {
        self.positions.contains_key(&member)
    }

    /// Members in index order.
    #[must_use]
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One debt owed by a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwesEntry {
    /// Creditor.
    pub to: UserId,
    /// Amount, always positive.
    pub amount: Money,
}

/// One debt owed to a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwedByEntry {
    /// Debtor.
    pub from: UserId,
    /// Amount, always positive.
    pub amount: Money,
}

/// Per-member view of a netted group ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// The member.
    pub member_id: UserId,
    /// Running net position across the whole group.
    pub total_balance: Money,
    /// Who this member owes, in member order.
    pub owes: Vec<OwesEntry>,
    /// Who owes this member, in member order.
    pub owed_by: Vec<OwedByEntry>,
}

/// Pairwise ledger over a fixed member set.
#[derive(Debug, Clone)]
pub struct GroupLedger {
    index: MemberIndex,
    cells: Vec<Money>,
    totals: Vec<Money>,
    skipped: usize,
}

impl GroupLedger {
    /// Creates an all-zero ledger for `members`.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = UserId>,
    {
        let index = MemberIndex::new(members);
        let n = index.len();
        Self {
            index,
            cells: vec![Money::ZERO; n * n],
            totals: vec![Money::ZERO; n],
            skipped: 0,
        }
    }

    /// Builds and nets the ledger for a group.
    #[instrument(skip_all)]
    pub fn build<'a, 'b, I, E, S>(members: I, expenses: E, settlements: S) -> Self
    where
        I: IntoIterator<Item = UserId>,
        E: IntoIterator<Item = &'a Expense>,
        S: IntoIterator<Item = &'b Settlement>,
    {
        let mut ledger = Self::new(members);
        let mut expense_count = 0usize;
        let mut settlement_count = 0usize;

        for expense in expenses {
            ledger.apply_expense(expense);
            expense_count += 1;
        }
        for settlement in settlements {
            ledger.apply_settlement(settlement);
            settlement_count += 1;
        }
        ledger.net();

        debug!(
            members = ledger.index.len(),
            expenses = expense_count,
            settlements = settlement_count,
            skipped_edges = ledger.skipped,
            "group ledger built"
        );
        ledger
    }

    /// Adds every unpaid, non-payer split of `expense`.
    pub fn apply_expense(&mut self, expense: &Expense) {
        for edge in resolve_expense_edges(expense) {
            let Some((debtor, creditor)) = self.locate(&edge, "expense") else {
                continue;
            };
            let cell = self.cell(debtor, creditor);
            self.cells[cell] += edge.amount;
            self.totals[creditor] += edge.amount;
            self.totals[debtor] -= edge.amount;
        }
    }

    /// Reduces what the payer owed the receiver by the settlement amount.
    ///
    /// The cell may go negative here; netting resolves the direction.
    pub fn apply_settlement(&mut self, settlement: &Settlement) {
        let edge = resolve_settlement_edge(settlement);
        let Some((payer, receiver)) = self.locate(&edge, "settlement") else {
            return;
        };
        let cell = self.cell(payer, receiver);
        self.cells[cell] -= edge.amount;
        self.totals[payer] += edge.amount;
        self.totals[receiver] -= edge.amount;
    }

    /// Collapses each pair of opposing debts into one non-negative debt.
    ///
    /// Each unordered pair is visited once. Afterwards at most one direction
    /// per pair is non-zero, which makes a second pass a no-op.
    pub fn net(&mut self) {
        let n = self.index.len();
        for a in 0..n {
            for b in (a + 1)..n {
                let ab = self.cell(a, b);
                let ba = self.cell(b, a);
                let diff = self.cells[ab] - self.cells[ba];
                if diff.is_positive() {
                    self.cells[ab] = diff;
                    self.cells[ba] = Money::ZERO;
                } else if diff.is_negative() {
                    self.cells[ab] = Money::ZERO;
                    self.cells[ba] = -diff;
                } else {
                    self.cells[ab] = Money::ZERO;
                    self.cells[ba] = Money::ZERO;
                }
            }
        }
    }

    /// Amount `debtor` owes `creditor`; zero for unknown ids or `debtor == creditor`.
    #[must_use]
    pub fn owed(&self, debtor: UserId, creditor: UserId) -> Money {
        match (self.index.position(debtor), self.index.position(creditor)) {
            (Some(d), Some(c)) if d != c => self.cells[self.cell(d, c)],
            _ => Money::ZERO,
        }
    }

    /// Running net position of `member`, `None` for non-members.
    #[must_use]
    pub fn total_balance(&self, member: UserId) -> Option<Money> {
        self.index.position(member).map(|i| self.totals[i])
    }

    /// Positive debts owed by `member`, in member order.
    #[must_use]
    pub fn owes(&self, member: UserId) -> Vec<OwesEntry> {
        let Some(d) = self.index.position(member) else {
            return Vec::new();
        };
        self.index
            .members()
            .iter()
            .enumerate()
            .filter(|(c, _)| *c != d)
            .filter_map(|(c, to)| {
                let amount = self.cells[self.cell(d, c)];
                amount.is_positive().then_some(OwesEntry { to: *to, amount })
            })
            .collect()
    }

    /// Positive debts owed to `member`, in member order.
    #[must_use]
    pub fn owed_by(&self, member: UserId) -> Vec<OwedByEntry> {
        let Some(c) = self.index.position(member) else {
            return Vec::new();
        };
        self.index
            .members()
            .iter()
            .enumerate()
            .filter(|(d, _)| *d != c)
            .filter_map(|(d, from)| {
                let amount = self.cells[self.cell(d, c)];
                amount.is_positive().then_some(OwedByEntry {
                    from: *from,
                    amount,
                })
            })
            .collect()
    }

    /// Per-member summary in member order.
    #[must_use]
    pub fn member_balances(&self) -> Vec<MemberBalance> {
        self.index
            .members()
            .iter()
            .zip(&self.totals)
            .map(|(member, total)| MemberBalance {
                member_id: *member,
                total_balance: *total,
                owes: self.owes(*member),
                owed_by: self.owed_by(*member),
            })
            .collect()
    }

    /// Returns true if no pair has debts in both directions and no cell is negative.
    #[must_use]
    pub fn is_netted(&self) -> bool {
        let n = self.index.len();
        (0..n).all(|a| {
            ((a + 1)..n).all(|b| {
                let ab = self.cells[self.cell(a, b)];
                let ba = self.cells[self.cell(b, a)];
                !ab.is_negative() && !ba.is_negative() && (ab.is_zero() || ba.is_zero())
            })
        })
    }

    /// Sum of all members' totals. Zero for any well-built ledger.
    #[must_use]
    pub fn totals_sum(&self) -> Money {
        self.totals.iter().sum()
    }

    /// Number of edges skipped because they referenced a non-member.
    #[must_use]
    pub fn skipped_edges(&self) -> usize {
        self.skipped
    }

    /// The member index backing this ledger.
    #[must_use]
    pub fn members(&self) -> &MemberIndex {
        &self.index
    }

    fn cell(&self, debtor: usize, creditor: usize) -> usize {
        debtor * self.index.len() + creditor
    }

    fn locate(&mut self, edge: &DebtEdge, source: &'static str) -> Option<(usize, usize)> {
        match (
            self.index.position(edge.debtor),
            self.index.position(edge.creditor),
        ) {
            (Some(d), Some(c)) if d != c => Some((d, c)),
            _ => {
                self.skipped += 1;
                warn!(
                    source,
                    debtor = %edge.debtor,
                    creditor = %edge.creditor,
                    amount = %edge.amount,
                    "skipping edge outside the member set"
                );
                None
            }
        }
    }
}

/// Builds the netted ledger of a group and returns the per-member summary.
pub fn build_group_ledger<'a, 'b, E, S>(
    members: &[UserId],
    expenses: E,
    settlements: S,
) -> Vec<MemberBalance>
where
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'b Settlement>,
{
    GroupLedger::build(members.iter().copied(), expenses, settlements).member_balances()
}
