#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod settlement_service;
pub mod validation;

pub use error::{ExpenseValidationError, SettlementWarning};
pub use model::{
    BalanceStatus, ExpenseRecord, ParticipantBalance, ParticipantSummary, SettlementReport,
    SplitRecord, TripLedger,
};
pub use ports::ParticipantDirectory;
pub use settlement_service::SettlementService;
pub use validation::{ExpenseValidator, MAX_EXPENSE_AMOUNT};
