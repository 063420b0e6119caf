use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::error::ApiError;

/// Monetary amounts are kept at two decimal places, banker's rounding.
const SCALE: u32 = 2;

pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointNearestEven)
}

/// An amount as it arrives from a form: a JSON number, a numeric string,
/// or absent/null. All coercion funnels through here so no handler ever
/// parses money on its own.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(Decimal),
    Text(String),
    #[default]
    Missing,
}

impl RawAmount {
    fn coerce(&self, field: &'static str) -> Result<Option<Decimal>, ApiError> {
        match self {
            RawAmount::Number(amount) => Ok(Some(*amount)),
            RawAmount::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }

                trimmed.parse::<Decimal>()
                    .map(Some)
                    .map_err(|_| ApiError::Computation(format!("{field} does not coerce to a finite amount: {text:?}")))
            }
            RawAmount::Missing => Ok(None),
        }
    }

    /// Optional component amount. Absent fields default to zero.
    pub fn optional(&self, field: &'static str) -> Result<Decimal, ApiError> {
        component(self.coerce(field)?, field)
    }

    /// Required amount. Absent fields are a validation error.
    pub fn required(&self, field: &'static str) -> Result<Decimal, ApiError> {
        required(self.coerce(field)?, field)
    }
}

/// Normalize an optional component into a non-negative two-decimal amount,
/// defaulting to zero when absent. Idempotent for already-normal values.
pub fn component(value: Option<Decimal>, field: &'static str) -> Result<Decimal, ApiError> {
    let amount = value.unwrap_or_default();

    if amount < Decimal::ZERO {
        return Err(ApiError::Validation(format!("{field} must not be negative")));
    }

    Ok(round(amount))
}

pub fn required(value: Option<Decimal>, field: &'static str) -> Result<Decimal, ApiError> {
    match value {
        Some(amount) => component(Some(amount), field),
        None => Err(ApiError::Validation(format!("{field} is required"))),
    }
}
