use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tripsplit_domain::{Money, ParticipantId, Transaction};

use crate::error::SettlementWarning;

/// Everything a collaborator hands over for one trip.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TripLedger {
    #[serde(default)]
    pub currency: Option<String>,
    pub participants: Vec<ParticipantId>,
    /// Optional display names keyed by participant id.
    #[serde(default)]
    pub names: IndexMap<ParticipantId, String>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub payer: ParticipantId,
    pub amount: Decimal,
    #[serde(default)]
    pub splits: Vec<SplitRecord>,
}

/// One split line as stored upstream.
///
/// `share_value` is interpreted by `share_type`. An `equal` split may
/// instead carry a pre-divided `amount` and no `share_value`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SplitRecord {
    pub participant: ParticipantId,
    pub share_type: String,
    #[serde(default)]
    pub share_value: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub settled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantBalance {
    pub participant: ParticipantId,
    pub balance: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Owed,
    Owes,
    Settled,
}

/// What one participant paid and owes across the whole trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantSummary {
    pub participant: ParticipantId,
    pub paid: Money,
    pub owed: Money,
    pub net: Money,
    pub status: BalanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub currency: Option<String>,
    pub balances: Vec<ParticipantBalance>,
    pub transactions: Vec<Transaction>,
    pub participant_summaries: Vec<ParticipantSummary>,
    pub total_expenses: Money,
    pub per_person_share: Money,
    pub warnings: Vec<SettlementWarning>,
}

impl SettlementReport {
    /// True when nothing needs to be paid and no inconsistency was found.
    pub fn is_fully_settled(&self) -> bool {
        self.transactions.is_empty()
            && !self
                .warnings
                .iter()
                .any(|warning| matches!(warning, SettlementWarning::ResidualImbalance { .. }))
    }
}
