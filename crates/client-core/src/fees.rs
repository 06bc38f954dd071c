//! Tiered fee-rate engine.
//!
//! One explorer sample becomes three tiers at fixed multipliers. Absolute
//! fees are always `ceil(rate * size)` so rounding never underpays.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClientError;

pub const AVERAGE_MULTIPLIER: f64 = 0.5;
pub const FAST_MULTIPLIER: f64 = 1.0;
pub const FASTEST_MULTIPLIER: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeOption {
    Average,
    Fast,
    Fastest,
}

/// Fee rates per tier, in base units per byte (or per gas).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeRates {
    pub average: f64,
    pub fast: f64,
    pub fastest: f64,
}

impl FeeRates {
    pub fn from_sample(sample: f64) -> Self {
        Self {
            average: sample * AVERAGE_MULTIPLIER,
            fast: sample * FAST_MULTIPLIER,
            fastest: sample * FASTEST_MULTIPLIER,
        }
    }

    pub fn rate(&self, option: FeeOption) -> f64 {
        match option {
            FeeOption::Average => self.average,
            FeeOption::Fast => self.fast,
            FeeOption::Fastest => self.fastest,
        }
    }
}

/// Absolute fees per tier, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fees {
    pub average: u128,
    pub fast: u128,
    pub fastest: u128,
}

impl Fees {
    pub fn fee(&self, option: FeeOption) -> u128 {
        match option {
            FeeOption::Average => self.average,
            FeeOption::Fast => self.fast,
            FeeOption::Fastest => self.fastest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeesWithRates {
    pub rates: FeeRates,
    pub fees: Fees,
}

impl FeesWithRates {
    /// Apply every tier of `rates` to one transaction size.
    pub fn for_size(rates: FeeRates, size: u64) -> Self {
        Self {
            rates,
            fees: Fees {
                average: u128::from(fee_for(rates.average, size)),
                fast: u128::from(fee_for(rates.fast, size)),
                fastest: u128::from(fee_for(rates.fastest, size)),
            },
        }
    }
}

/// Relative error below which a product counts as a whole number.
const WHOLE_FEE_TOLERANCE: f64 = 1e-9;

/// Absolute fee for `size` bytes at `rate`, rounded up.
///
/// Products that are whole up to float noise (`1.1 * 110`) are not rounded
/// up past the exact value.
pub fn fee_for(rate: f64, size: u64) -> u64 {
    let exact = rate * size as f64;
    let nearest = exact.round();
    if (exact - nearest).abs() <= WHOLE_FEE_TOLERANCE * nearest.max(1.0) {
        nearest as u64
    } else {
        exact.ceil() as u64
    }
}

/// Reject rates no transaction could be priced with.
pub fn validate_fee_rate(rate: f64) -> Result<f64, ClientError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ClientError::InvalidParams(format!("fee rate {rate} is not a usable rate")));
    }
    Ok(rate)
}

/// Await one explorer sample. Any failure, or an unusable value, yields
/// `fallback` instead of an error.
pub async fn sample_fee_rate<F>(sample: F, fallback: f64) -> f64
where
    F: Future<Output = Result<f64, ClientError>>,
{
    match sample.await {
        Ok(rate) if rate.is_finite() && rate > 0.0 => rate,
        Ok(rate) => {
            warn!(rate, fallback, "explorer returned an unusable fee rate, using fallback");
            fallback
        }
        Err(e) => {
            warn!(error = %e, fallback, "fee rate sample failed, using fallback");
            fallback
        }
    }
}
