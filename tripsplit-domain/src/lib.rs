#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Balances, Expense, Money, ParticipantId, Settlement, ShareType, ShareTypeError, SplitEntry,
    SplitRule, Transaction,
};
pub use services::{
    BalanceAggregator, RoundingMode, SettlementCalculator, SettlementContext,
    SettlementContextError, aggregate_balances, compute_settlement, compute_settlement_with,
    minimize_transactions, minimize_transactions_with, resolve_share,
};
