//! Greedy min-cash-flow pass that turns net balances into transfers.
//!
//! This is a heuristic. Finding the provably smallest set of transfers is
//! NP-hard in general; pairing the largest creditor with the largest debtor
//! first keeps the count at most `unsettled participants - 1` and is usually
//! close to minimal for trip-sized groups.

use crate::{
    model::{Balances, Money, ParticipantId, Transaction},
    services::settlement_rounding::SettlementContext,
};

struct Position {
    participant: ParticipantId,
    amount: Money,
}

/// [`minimize_transactions_with`] under the default two-decimal context.
pub fn minimize_transactions(balances: &Balances) -> Vec<Transaction> {
    minimize_transactions_with(balances, SettlementContext::default())
}

/// Emits transfers that clear `balances`.
///
/// Balances within `context.tolerance` of zero are left out. Creditors and
/// debtors are each ordered by amount, largest first, with ties broken by
/// participant id. Both lists are then walked with one cursor each, and
/// every step settles the smaller of the two current amounts. Emitted
/// amounts are rounded; the running amounts are not.
///
/// If credits and debits do not cancel out, the walk stops when either side
/// runs out and the remainder is left unsettled.
pub fn minimize_transactions_with(
    balances: &Balances,
    context: SettlementContext,
) -> Vec<Transaction> {
    let tolerance = context.tolerance;
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();

    for (participant, &balance) in balances {
        if balance > tolerance {
            creditors.push(Position {
                participant: participant.clone(),
                amount: balance,
            });
        } else if balance < -tolerance {
            debtors.push(Position {
                participant: participant.clone(),
                amount: balance.abs(),
            });
        }
    }

    sort_positions(&mut creditors);
    sort_positions(&mut debtors);

    let mut transactions = Vec::with_capacity(creditors.len() + debtors.len());
    let mut creditor_idx = 0;
    let mut debtor_idx = 0;

    while creditor_idx < creditors.len() && debtor_idx < debtors.len() {
        let creditor = &mut creditors[creditor_idx];
        let debtor = &mut debtors[debtor_idx];

        let settle = creditor.amount.min(debtor.amount);
        let rounded = context.round(settle);
        if !rounded.is_zero() {
            transactions.push(Transaction {
                from: debtor.participant.clone(),
                to: creditor.participant.clone(),
                amount: rounded,
            });
        }

        creditor.amount -= settle;
        debtor.amount -= settle;

        if is_exhausted(creditor.amount, tolerance) {
            creditor_idx += 1;
        }
        if is_exhausted(debtor.amount, tolerance) {
            debtor_idx += 1;
        }
    }

    tracing::debug!(
        creditor_count = creditors.len(),
        debtor_count = debtors.len(),
        transaction_count = transactions.len(),
        unmatched_creditors = creditors.len() - creditor_idx,
        unmatched_debtors = debtors.len() - debtor_idx,
        "Minimized settlement transactions"
    );

    transactions
}

fn sort_positions(positions: &mut [Position]) {
    positions.sort_by(|lhs, rhs| {
        rhs.amount
            .cmp(&lhs.amount)
            .then_with(|| lhs.participant.cmp(&rhs.participant))
    });
}

// The zero check keeps a zero tolerance from stalling the walk.
fn is_exhausted(amount: Money, tolerance: Money) -> bool {
    amount < tolerance || amount.is_zero()
}
