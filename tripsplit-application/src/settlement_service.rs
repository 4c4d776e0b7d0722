use fxhash::FxHashMap;
use rust_decimal::Decimal;
use tripsplit_domain::{
    Expense, Money, ParticipantId, Settlement, SettlementCalculator, SettlementContext,
};

use crate::{
    error::{ExpenseValidationError, SettlementWarning},
    model::{
        BalanceStatus, ParticipantBalance, ParticipantSummary, SettlementReport, TripLedger,
    },
    validation::ExpenseValidator,
};

/// Validates a trip ledger and produces its settlement report.
///
/// Every call recomputes from the full expense list.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettlementService {
    context: SettlementContext,
}

impl SettlementService {
    pub fn new(context: SettlementContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> SettlementContext {
        self.context
    }

    pub fn settle(&self, ledger: &TripLedger) -> Result<SettlementReport, ExpenseValidationError> {
        let expenses = ExpenseValidator::new(self.context).validate_all(&ledger.expenses)?;
        let settlement =
            SettlementCalculator::new(self.context).calculate(&ledger.participants, &expenses);

        let warnings = self.collect_warnings(&settlement);
        let participant_summaries = self.summarize(&settlement, &expenses);
        let total_expenses: Money = expenses.iter().map(|expense| expense.amount).sum();
        let per_person_share = if ledger.participants.is_empty() {
            Money::ZERO
        } else {
            Money::from_decimal(
                total_expenses.as_decimal() / Decimal::from(ledger.participants.len()),
            )
        };

        tracing::info!(
            participant_count = settlement.balances.len(),
            expense_count = expenses.len(),
            transaction_count = settlement.transactions.len(),
            warning_count = warnings.len(),
            "Settlement computed"
        );

        let Settlement {
            balances,
            transactions,
            ..
        } = settlement;

        Ok(SettlementReport {
            currency: ledger.currency.clone(),
            balances: balances
                .into_iter()
                .map(|(participant, balance)| ParticipantBalance {
                    participant,
                    balance,
                })
                .collect(),
            transactions,
            participant_summaries,
            total_expenses,
            per_person_share,
            warnings,
        })
    }

    fn collect_warnings(&self, settlement: &Settlement) -> Vec<SettlementWarning> {
        let mut warnings: Vec<SettlementWarning> = settlement
            .unknown_participants
            .iter()
            .map(|participant| SettlementWarning::UnknownParticipantInExpense {
                participant: participant.clone(),
            })
            .collect();

        let residual = settlement.outstanding();
        if !self.context.is_settled(residual) {
            tracing::warn!(
                residual = %residual,
                tolerance = %self.context.tolerance,
                "Settlement may be inaccurate due to inconsistent expense data"
            );
            warnings.push(SettlementWarning::ResidualImbalance { residual });
        }

        warnings
    }

    fn summarize(&self, settlement: &Settlement, expenses: &[Expense]) -> Vec<ParticipantSummary> {
        let mut paid: FxHashMap<&ParticipantId, Money> = FxHashMap::default();
        let mut owed: FxHashMap<&ParticipantId, Money> = FxHashMap::default();

        for expense in expenses {
            *paid.entry(&expense.payer).or_default() += expense.amount;
            for split in &expense.splits {
                *owed.entry(&split.participant).or_default() += split.rule.resolve(expense.amount);
            }
        }

        settlement
            .balances
            .keys()
            .map(|participant| {
                let paid = paid.get(participant).copied().unwrap_or_default();
                let owed = owed.get(participant).copied().unwrap_or_default();
                let net = paid - owed;
                let status = if self.context.is_settled(net) {
                    BalanceStatus::Settled
                } else if net.is_positive() {
                    BalanceStatus::Owed
                } else {
                    BalanceStatus::Owes
                };
                ParticipantSummary {
                    participant: participant.clone(),
                    paid,
                    owed,
                    net,
                    status,
                }
            })
            .collect()
    }
}
