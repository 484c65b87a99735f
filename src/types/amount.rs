use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::TransactionType;
use crate::types::ConfigError;

const DECIMAL_PLACES: u32 = 2;

/// Largest amount in cents. Fifteen significant digits is the most a JSON number (an IEEE
/// double) carries back to the same decimal text.
pub const MAX_AMOUNT_CENTS: i64 = 999_999_999_999_999;

/// How the amount for one transaction type is drawn.
///
/// Bounds and choices are expressed in currency units with at most two decimal
/// places, e.g. `{ kind = "uniform", min = "1.00", max = "500.00" }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmountRule {
    Uniform {
        min: Decimal,
        max: Decimal
    },
    Choice {
        values: Vec<Decimal>
    }
}

impl AmountRule {
    pub fn uniform(min: Decimal, max: Decimal) -> Self {
        Self::Uniform { min, max }
    }

    pub fn choice(values: impl IntoIterator<Item = Decimal>) -> Self {
        Self::Choice { values: values.into_iter().collect() }
    }

    /// Validates the rule and converts it into integer cents for sampling.
    pub fn sampler(&self, transaction_type: TransactionType) -> Result<AmountSampler, ConfigError> {
        let cents = |value: Decimal| to_cents(value).ok_or_else(|| {
            ConfigError::invalid_amount(transaction_type, format!("[{value}] must be positive, at most {} and have at most two decimal places", Decimal::new(MAX_AMOUNT_CENTS, DECIMAL_PLACES)))
        });

        match self {
            Self::Uniform { min, max } => {
                let min_cents = cents(*min)?;
                let max_cents = cents(*max)?;

                if min_cents > max_cents {
                    return Err(ConfigError::invalid_amount(transaction_type, format!("min [{min}] is greater than max [{max}]")));
                }

                Ok(AmountSampler::Uniform { min_cents, max_cents })
            }
            Self::Choice { values } => {
                if values.is_empty() {
                    return Err(ConfigError::invalid_amount(transaction_type, "choice list is empty"));
                }

                let values = values.iter().copied().map(cents).collect::<Result<Vec<_>, _>>()?;

                Ok(AmountSampler::Choice(values))
            }
        }
    }
}

/// A validated amount rule. Every value it can produce is strictly positive.
#[derive(Debug, Clone)]
pub enum AmountSampler {
    Uniform {
        min_cents: i64,
        max_cents: i64
    },
    Choice(Vec<i64>)
}

impl AmountSampler {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let cents = match self {
            Self::Uniform { min_cents, max_cents } => rng.gen_range(*min_cents..=*max_cents),
            Self::Choice(values) => values[rng.gen_range(0..values.len())]
        };

        Decimal::new(cents, DECIMAL_PLACES)
    }
}

fn to_cents(value: Decimal) -> Option<i64> {
    let scaled = value.checked_mul(Decimal::ONE_HUNDRED)?;

    if !scaled.fract().is_zero() {
        return None;
    }

    scaled.to_i64().filter(|cents| (1..=MAX_AMOUNT_CENTS).contains(cents))
}
