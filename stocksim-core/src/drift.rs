//! Market-wide drift composition.
//!
//! A market either applies only each group's own bias, or adds one Gaussian
//! draw per day shared by every group.

use rand::RngCore;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriftPolicy {
    /// Groups move under their own bias only.
    #[default]
    None,
    /// Each day adds `Normal(mean, stdev)` to every group's bias.
    GaussianDaily { mean: f64, stdev: f64 },
}

impl DriftPolicy {
    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            DriftPolicy::None => Ok(()),
            DriftPolicy::GaussianDaily { mean, stdev } => {
                if !mean.is_finite() {
                    return Err(SimError::invalid(format!(
                        "daily bias mean must be finite, got {mean}"
                    )));
                }
                if !stdev.is_finite() || stdev < 0.0 {
                    return Err(SimError::invalid(format!(
                        "daily bias stdev must be finite and non-negative, got {stdev}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Validate the policy and build the per-day sampler it describes.
    pub fn sampler(&self) -> Result<DriftSampler, SimError> {
        self.validate()?;
        Ok(match *self {
            DriftPolicy::None => DriftSampler::Fixed(0.0),
            DriftPolicy::GaussianDaily { mean, stdev } if stdev == 0.0 => DriftSampler::Fixed(mean),
            DriftPolicy::GaussianDaily { mean, stdev } => DriftSampler::Gaussian(
                Normal::new(mean, stdev)
                    .map_err(|e| SimError::invalid(format!("daily bias: {e}")))?,
            ),
        })
    }
}

/// A validated [`DriftPolicy`], ready to draw.
#[derive(Debug, Clone, Copy)]
pub enum DriftSampler {
    /// Same offset every day; draws nothing.
    Fixed(f64),
    Gaussian(Normal<f64>),
}

impl Default for DriftSampler {
    fn default() -> Self {
        DriftSampler::Fixed(0.0)
    }
}

impl DriftSampler {
    /// Extra drift for one day.
    pub fn daily_offset(&self, rng: &mut dyn RngCore) -> f64 {
        match self {
            DriftSampler::Fixed(offset) => *offset,
            DriftSampler::Gaussian(normal) => normal.sample(rng),
        }
    }
}
