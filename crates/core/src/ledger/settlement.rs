//! Settlement resolution.

use super::types::{DebtEdge, Settlement};

/// Returns the debt-reduction edge of a settlement.
///
/// The edge reads `paid_by -> received_by`: the payment cancels up to
/// `amount` of what the payer owed the receiver. From the payer's side it
/// lowers what they owe; from the receiver's side it lowers what they are
/// owed. Input is assumed well-formed (positive amount, distinct parties).
#[must_use]
pub fn resolve_settlement_edge(settlement: &Settlement) -> DebtEdge {
    DebtEdge {
        debtor: settlement.paid_by,
        creditor: settlement.received_by,
        amount: settlement.amount,
    }
}
