//! Shock models: the per-step random variate that moves an instrument.
//!
//! Each instrument owns one boxed `ShockModel`. The random source is never
//! captured: callers pass their own RNG on every draw, so a run seeded once is
//! reproducible end to end.

use std::fmt::Debug;

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// A generator producing one fractional price shock per call.
pub trait ShockModel: Send + Sync + Debug {
    fn sample(&self, rng: &mut dyn RngCore) -> f64;

    /// Width of the shock: the magnitude a single draw is scaled by.
    fn volatility(&self) -> f64;
}

/// Uniform shock on `[-half_width, half_width]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformShock {
    half_width: f64,
}

impl UniformShock {
    pub fn new(half_width: f64) -> Result<Self, SimError> {
        if !half_width.is_finite() || half_width < 0.0 {
            return Err(SimError::invalid(format!(
                "uniform shock width must be finite and non-negative, got {half_width}"
            )));
        }
        Ok(Self { half_width })
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }
}

impl ShockModel for UniformShock {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        if self.half_width == 0.0 {
            return 0.0;
        }
        rng.gen_range(-self.half_width..=self.half_width)
    }

    fn volatility(&self) -> f64 {
        self.half_width
    }
}

/// Zero-mean Gaussian shock.
#[derive(Debug, Clone, Copy)]
pub struct GaussianShock {
    stdev: f64,
    normal: Normal<f64>,
}

impl GaussianShock {
    pub fn new(stdev: f64) -> Result<Self, SimError> {
        if !stdev.is_finite() || stdev < 0.0 {
            return Err(SimError::invalid(format!(
                "gaussian shock stdev must be finite and non-negative, got {stdev}"
            )));
        }
        let normal = Normal::new(0.0, stdev)
            .map_err(|e| SimError::invalid(format!("gaussian shock: {e}")))?;
        Ok(Self { stdev, normal })
    }

    pub fn stdev(&self) -> f64 {
        self.stdev
    }
}

impl ShockModel for GaussianShock {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        if self.stdev == 0.0 {
            return 0.0;
        }
        self.normal.sample(rng)
    }

    fn volatility(&self) -> f64 {
        self.stdev
    }
}

/// Deterministic shock: returns the same value on every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantShock(pub f64);

impl ShockModel for ConstantShock {
    fn sample(&self, _rng: &mut dyn RngCore) -> f64 {
        self.0
    }

    fn volatility(&self) -> f64 {
        self.0.abs()
    }
}

/// Shock family selected when a market is generated from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockKind {
    /// `Uniform[-volatility, volatility]`
    #[default]
    Uniform,
    /// `Normal(0, volatility)`
    Gaussian,
}

impl ShockKind {
    /// Build a boxed shock model parameterized by `volatility`.
    pub fn build(self, volatility: f64) -> Result<Box<dyn ShockModel>, SimError> {
        Ok(match self {
            ShockKind::Uniform => Box::new(UniformShock::new(volatility)?),
            ShockKind::Gaussian => Box::new(GaussianShock::new(volatility)?),
        })
    }
}
