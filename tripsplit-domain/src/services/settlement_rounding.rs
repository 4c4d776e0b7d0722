//! Numeric policy for settlement: how close to zero counts as settled and
//! how emitted transfer amounts are rounded.
//!
//! Balances are never rounded while they accumulate. Rounding happens only
//! when a transfer amount is emitted, so per-split error cannot compound.

use crate::model::Money;
use rust_decimal::RoundingStrategy;

/// Rounding mode for emitted transfer amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (e.g., 0.005 -> 0.01).
    #[default]
    HalfUp,
    /// Round half to nearest even number (banker's rounding).
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Context for settlement computation.
///
/// # Example
/// ```
/// use tripsplit_domain::services::{RoundingMode, SettlementContext};
/// use tripsplit_domain::Money;
///
/// let ctx = SettlementContext::try_new(0, Money::new(5, 1), RoundingMode::HalfEven).unwrap();
/// assert_eq!(ctx.round(Money::new(25, 1)), Money::from_i64(2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementContext {
    /// Number of decimal places of emitted transfer amounts (2 for cents).
    pub scale: u32,
    /// Balances whose magnitude is at most this are treated as settled.
    pub tolerance: Money,
    pub rounding_mode: RoundingMode,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettlementContextError {
    #[error("scale {scale} exceeds the maximum supported scale {max_supported}")]
    UnsupportedScale { scale: u32, max_supported: u32 },
    #[error("tolerance must not be negative (found {0})")]
    NegativeTolerance(Money),
}

pub const DEFAULT_SCALE: u32 = 2;
pub const MAX_SETTLEMENT_SCALE: u32 = 28;

impl SettlementContext {
    /// Two decimal places, 0.01 tolerance, half-up rounding.
    pub fn cents_default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            tolerance: Money::new(1, DEFAULT_SCALE),
            rounding_mode: RoundingMode::HalfUp,
        }
    }

    pub fn try_new(
        scale: u32,
        tolerance: Money,
        rounding_mode: RoundingMode,
    ) -> Result<Self, SettlementContextError> {
        if scale > MAX_SETTLEMENT_SCALE {
            return Err(SettlementContextError::UnsupportedScale {
                scale,
                max_supported: MAX_SETTLEMENT_SCALE,
            });
        }
        if tolerance.is_negative() {
            return Err(SettlementContextError::NegativeTolerance(tolerance));
        }
        Ok(Self {
            scale,
            tolerance,
            rounding_mode,
        })
    }

    pub fn round(self, amount: Money) -> Money {
        amount.round_dp_with_strategy(self.scale, self.rounding_mode.strategy())
    }

    pub fn is_settled(self, balance: Money) -> bool {
        balance.abs() <= self.tolerance
    }
}

impl Default for SettlementContext {
    fn default() -> Self {
        Self::cents_default()
    }
}
