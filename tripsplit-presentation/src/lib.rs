#![warn(clippy::uninlined_format_args)]

pub mod labels;
pub mod settlement_presenter;
pub mod text_table;

pub use settlement_presenter::{SettlementPresenter, SettlementView};
