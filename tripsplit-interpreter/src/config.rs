use std::{borrow::Cow, env, str::FromStr};

use rust_decimal::Decimal;
use tripsplit_domain::{
    Money, RoundingMode, SettlementContext,
    services::{DEFAULT_SCALE, MAX_SETTLEMENT_SCALE},
};

pub const SCALE_VAR: &str = "TRIPSPLIT_SCALE";
pub const TOLERANCE_VAR: &str = "TRIPSPLIT_TOLERANCE";
pub const ROUNDING_VAR: &str = "TRIPSPLIT_ROUNDING";

/// Numeric settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub context: SettlementContext,
}

impl InterpreterConfig {
    pub fn from_env() -> Result<Self, Cow<'static, str>> {
        let _ = dotenvy::dotenv();
        Self::from_values(
            env::var(SCALE_VAR).ok().as_deref(),
            env::var(TOLERANCE_VAR).ok().as_deref(),
            env::var(ROUNDING_VAR).ok().as_deref(),
        )
    }

    /// Tolerance defaults to one unit of the configured scale.
    pub fn from_values(
        scale: Option<&str>,
        tolerance: Option<&str>,
        rounding: Option<&str>,
    ) -> Result<Self, Cow<'static, str>> {
        let scale = match scale {
            Some(raw) => parse_var::<u32>(SCALE_VAR, raw)?,
            None => DEFAULT_SCALE,
        };
        let tolerance = match tolerance {
            Some(raw) => Money::from_decimal(parse_var::<Decimal>(TOLERANCE_VAR, raw)?),
            None if scale <= MAX_SETTLEMENT_SCALE => Money::new(1, scale),
            None => Money::ZERO,
        };
        let rounding_mode = match rounding.map(str::trim) {
            None | Some("") => RoundingMode::default(),
            Some(raw) => parse_rounding(raw)?,
        };

        let context = SettlementContext::try_new(scale, tolerance, rounding_mode)
            .map_err(|err| format!("Invalid settlement settings: {err}"))?;
        Ok(Self { context })
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T, Cow<'static, str>> {
    raw.trim()
        .parse()
        .map_err(|_| format!("{name} has an invalid value '{raw}'").into())
}

fn parse_rounding(raw: &str) -> Result<RoundingMode, Cow<'static, str>> {
    match raw.to_ascii_lowercase().as_str() {
        "half_up" | "half-up" => Ok(RoundingMode::HalfUp),
        "half_even" | "half-even" | "bankers" => Ok(RoundingMode::HalfEven),
        _ => Err(format!("{ROUNDING_VAR} must be half_up or half_even (found '{raw}')").into()),
    }
}
