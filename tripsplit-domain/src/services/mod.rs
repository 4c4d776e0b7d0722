pub mod balance_aggregator;
pub mod settlement_calculator;
pub mod settlement_rounding;
pub mod share_resolver;
pub mod transaction_minimizer;

pub use balance_aggregator::{BalanceAggregator, aggregate_balances};
pub use settlement_calculator::{SettlementCalculator, compute_settlement, compute_settlement_with};
pub use settlement_rounding::{
    DEFAULT_SCALE, MAX_SETTLEMENT_SCALE, RoundingMode, SettlementContext, SettlementContextError,
};
pub use share_resolver::{checked_resolve_share, resolve_share};
pub use transaction_minimizer::{minimize_transactions, minimize_transactions_with};
