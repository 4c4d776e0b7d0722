use crate::model::{Money, ShareType};
use rust_decimal::Decimal;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Computes the share of `total` owed under one split line.
///
/// * `Exact`: `share_value` is the owed amount.
/// * `Percentage`: `share_value` is a percentage in `0..=100`.
/// * `Equal`: `share_value` is the number of people splitting equally, and a
///   non-positive count yields a zero share.
pub fn resolve_share(total: Money, share_value: Decimal, share_type: ShareType) -> Money {
    match share_type {
        ShareType::Exact => Money::from_decimal(share_value),
        ShareType::Percentage => Money::from_decimal(total.as_decimal() * share_value / ONE_HUNDRED),
        ShareType::Equal => {
            if share_value > Decimal::ZERO {
                Money::from_decimal(total.as_decimal() / share_value)
            } else {
                Money::ZERO
            }
        }
    }
}

/// [`resolve_share`] that reports `None` instead of overflowing.
pub fn checked_resolve_share(
    total: Money,
    share_value: Decimal,
    share_type: ShareType,
) -> Option<Money> {
    let share = match share_type {
        ShareType::Exact => share_value,
        ShareType::Percentage => total
            .as_decimal()
            .checked_mul(share_value)?
            .checked_div(ONE_HUNDRED)?,
        ShareType::Equal if share_value > Decimal::ZERO => {
            total.as_decimal().checked_div(share_value)?
        }
        ShareType::Equal => Decimal::ZERO,
    };
    Some(Money::from_decimal(share))
}
