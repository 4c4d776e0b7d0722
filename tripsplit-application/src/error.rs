use rust_decimal::Decimal;
use serde::Serialize;
use tripsplit_domain::{Money, ParticipantId};

/// Contract violations caught before expenses reach the settlement core.
///
/// `expense` is the record's id, or its position in the ledger (`#1`, `#2`,
/// ...) when it has none.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseValidationError {
    #[error("expense {expense}: at least one split is required")]
    EmptySplitSet { expense: String },
    #[error("expense {expense}: invalid share type `{value}`")]
    InvalidShareType { expense: String, value: String },
    #[error("expense {expense}: split for {participant} has no share value")]
    MissingShareValue {
        expense: String,
        participant: ParticipantId,
    },
    #[error("expense {expense}: amount must not be negative (found {amount})")]
    NegativeAmount { expense: String, amount: Decimal },
    #[error("expense {expense}: amounts must stay within {limit}")]
    AmountOutOfRange { expense: String, limit: Decimal },
    #[error("expense {expense}: split amounts must equal the total ({split_sum} != {total})")]
    SplitSumMismatch {
        expense: String,
        total: Money,
        split_sum: Money,
    },
}

/// Data-integrity findings that do not block a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettlementWarning {
    UnknownParticipantInExpense { participant: ParticipantId },
    ResidualImbalance { residual: Money },
}
