use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::services::share_resolver::{checked_resolve_share, resolve_share};

/// Opaque identifier of a trip member.
///
/// Ordering is lexicographic on the identifier and serves as the stable
/// tie-break key wherever two members compare equal on amount.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(SmolStr);

impl ParticipantId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn round_dp_with_strategy(self, dp: u32, strategy: RoundingStrategy) -> Self {
        Self(self.0.round_dp_with_strategy(dp, strategy))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(value.trim()).map(Self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareType {
    Equal,
    Percentage,
    Exact,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShareTypeError {
    #[error("invalid share type `{0}` (expected equal, percentage or exact)")]
    InvalidShareType(String),
}

impl FromStr for ShareType {
    type Err = ShareTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(Self::Equal),
            "percentage" => Ok(Self::Percentage),
            "exact" => Ok(Self::Exact),
            _ => Err(ShareTypeError::InvalidShareType(value.to_owned())),
        }
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Exact => "exact",
        })
    }
}

/// How one participant's share of an expense is derived from its total.
///
/// "Equal" splits exist in two historical encodings, and each has its own
/// constructor so callers state which one they mean:
/// * [`SplitRule::equal`] carries the number of people splitting, and the
///   share is `total / count`.
/// * [`SplitRule::equal_precomputed`] carries an amount that was already
///   divided by the caller, and the share is that amount as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitRule {
    Equal { count: Decimal },
    EqualAmount { amount: Money },
    Percentage { percent: Decimal },
    Exact { amount: Money },
}

impl SplitRule {
    pub fn equal(count: impl Into<Decimal>) -> Self {
        Self::Equal {
            count: count.into(),
        }
    }

    pub fn equal_precomputed(amount: Money) -> Self {
        Self::EqualAmount { amount }
    }

    pub fn percentage(percent: impl Into<Decimal>) -> Self {
        Self::Percentage {
            percent: percent.into(),
        }
    }

    pub fn exact(amount: Money) -> Self {
        Self::Exact { amount }
    }

    /// Builds a rule from the untyped `(share type, share value)` pair.
    ///
    /// `Equal` always maps to the divisor form.
    pub fn from_parts(share_type: ShareType, share_value: Decimal) -> Self {
        match share_type {
            ShareType::Equal => Self::Equal { count: share_value },
            ShareType::Percentage => Self::Percentage {
                percent: share_value,
            },
            ShareType::Exact => Self::Exact {
                amount: Money::from_decimal(share_value),
            },
        }
    }

    /// Like [`SplitRule::from_parts`], but parses the share type first.
    pub fn parse(share_type: &str, share_value: Decimal) -> Result<Self, ShareTypeError> {
        Ok(Self::from_parts(share_type.parse()?, share_value))
    }

    pub fn share_type(&self) -> ShareType {
        match self {
            Self::Equal { .. } | Self::EqualAmount { .. } => ShareType::Equal,
            Self::Percentage { .. } => ShareType::Percentage,
            Self::Exact { .. } => ShareType::Exact,
        }
    }

    /// The owed share of `total` under this rule.
    pub fn resolve(&self, total: Money) -> Money {
        match *self {
            Self::Equal { count } => resolve_share(total, count, ShareType::Equal),
            Self::EqualAmount { amount } => amount,
            Self::Percentage { percent } => resolve_share(total, percent, ShareType::Percentage),
            Self::Exact { amount } => resolve_share(total, amount.as_decimal(), ShareType::Exact),
        }
    }

    /// Like [`SplitRule::resolve`], but `None` when the share does not fit
    /// in a `Decimal`.
    pub fn checked_resolve(&self, total: Money) -> Option<Money> {
        match *self {
            Self::Equal { count } => checked_resolve_share(total, count, ShareType::Equal),
            Self::EqualAmount { amount } | Self::Exact { amount } => Some(amount),
            Self::Percentage { percent } => {
                checked_resolve_share(total, percent, ShareType::Percentage)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitEntry {
    pub participant: ParticipantId,
    pub rule: SplitRule,
    /// Marked by whoever records payments. Settlement never looks at it.
    pub settled: bool,
}

impl SplitEntry {
    pub fn new(participant: impl Into<ParticipantId>, rule: SplitRule) -> Self {
        Self {
            participant: participant.into(),
            rule,
            settled: false,
        }
    }
}

/// One shared expense, already normalized to a single currency.
///
/// Callers guarantee `splits` is non-empty and that the resolved shares sum
/// to `amount` within the settlement tolerance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub payer: ParticipantId,
    pub amount: Money,
    pub splits: Vec<SplitEntry>,
}

impl Expense {
    pub fn new(payer: impl Into<ParticipantId>, amount: Money, splits: Vec<SplitEntry>) -> Self {
        Self {
            payer: payer.into(),
            amount,
            splits,
        }
    }

    /// Sum of every split's resolved share, or `None` on overflow.
    pub fn split_total(&self) -> Option<Money> {
        self.splits.iter().try_fold(Money::ZERO, |total, split| {
            total.checked_add(split.rule.checked_resolve(self.amount)?)
        })
    }
}

/// Net position per participant. Positive means owed money.
pub type Balances = IndexMap<ParticipantId, Money>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub balances: Balances,
    pub transactions: Vec<Transaction>,
    /// Participants that appeared in an expense but not in the roster, in
    /// first-seen order.
    pub unknown_participants: Vec<ParticipantId>,
}

impl Settlement {
    /// Balances left over after every transaction has been paid.
    pub fn residuals(&self) -> Balances {
        let mut residuals = self.balances.clone();
        for transaction in &self.transactions {
            *residuals.entry(transaction.from.clone()).or_default() += transaction.amount;
            *residuals.entry(transaction.to.clone()).or_default() -= transaction.amount;
        }
        residuals
    }

    /// Money still unaccounted for once every transaction is paid: the
    /// larger of what creditors are still owed and what debtors still owe.
    ///
    /// Zero when the transactions clear every balance. It grows when a
    /// creditor's counterparties all fell inside the settlement tolerance, or
    /// when credits and debits never matched in the first place.
    pub fn outstanding(&self) -> Money {
        let (owed, owing) = self.residuals().into_values().fold(
            (Money::ZERO, Money::ZERO),
            |(owed, owing), residual| {
                if residual.is_positive() {
                    (owed + residual, owing)
                } else {
                    (owed, owing - residual)
                }
            },
        );
        owed.max(owing)
    }
}
