//! Regime shifts: periodic resampling of each group's drift around its
//! original baseline.

use rand::RngCore;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::domain::Market;
use crate::error::SimError;

/// Reference trading year used to derive the quarterly shift period.
pub const TRADING_DAYS_PER_YEAR: usize = 200;

/// When group drift is resampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegimeShift {
    Disabled,
    /// Resample at every tick `t` with `t % period == 0`, including tick 0.
    Every { period: usize },
}

impl RegimeShift {
    /// One shift per quarter of a trading year.
    pub fn quarterly(trading_days_per_year: usize) -> Self {
        RegimeShift::Every { period: trading_days_per_year / 4 }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            RegimeShift::Every { period: 0 } => {
                Err(SimError::invalid("regime shift period must be positive"))
            }
            _ => Ok(()),
        }
    }

    pub fn is_shift_tick(&self, tick: usize) -> bool {
        match *self {
            RegimeShift::Disabled => false,
            RegimeShift::Every { period } => period > 0 && tick % period == 0,
        }
    }
}

impl Default for RegimeShift {
    fn default() -> Self {
        Self::quarterly(TRADING_DAYS_PER_YEAR)
    }
}

/// Set every group's bias to `original + Normal(0, 2 * |original|)`.
pub fn resample_biases(market: &mut Market, rng: &mut dyn RngCore) -> Result<(), SimError> {
    for group in market.groups_mut() {
        let original = group.original_bias();
        let stdev = 2.0 * original.abs();
        let noise = if stdev == 0.0 {
            0.0
        } else {
            Normal::new(0.0, stdev)
                .map_err(|e| SimError::invalid(format!("regime shift for '{}': {e}", group.name())))?
                .sample(rng)
        };
        group.set_bias(original + noise)?;
    }
    Ok(())
}
