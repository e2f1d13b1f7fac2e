//! The day loop: regime shifts, market steps, daily aggregation.

use rand::rngs::StdRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::regime::{resample_biases, RegimeShift};
use crate::domain::{Market, Momentum};
use crate::error::SimError;
use crate::stats;

/// Parameters of a single run of the day loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub num_days: usize,
    pub momentum: Momentum,
    pub regime_shift: RegimeShift,
}

impl DriverConfig {
    pub fn new(num_days: usize) -> Self {
        Self { num_days, momentum: Momentum::Off, regime_shift: RegimeShift::default() }
    }

    pub fn with_momentum(mut self, momentum: Momentum) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_regime_shift(mut self, regime_shift: RegimeShift) -> Self {
        self.regime_shift = regime_shift;
        self
    }
}

/// What a finished run hands to reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Cross-sectional mean price for each simulated day.
    pub daily_means: Vec<f64>,
    /// Each instrument's price after the last day, group-major.
    pub final_prices: Vec<f64>,
    /// Ticks at which group drift was resampled.
    pub regime_shift_ticks: Vec<usize>,
}

impl SimulationOutcome {
    /// Mean price on the last day.
    pub fn closing_mean(&self) -> Option<f64> {
        self.daily_means.last().copied()
    }
}

/// Advances a market day by day with its own random source.
#[derive(Debug)]
pub struct SimulationDriver<R: RngCore = StdRng> {
    config: DriverConfig,
    rng: R,
}

impl<R: RngCore> SimulationDriver<R> {
    pub fn new(config: DriverConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Hand the random source back, e.g. to continue a seeded stream.
    pub fn into_rng(self) -> R {
        self.rng
    }

    fn validate(&self, market: &Market) -> Result<(), SimError> {
        if self.config.num_days == 0 {
            return Err(SimError::invalid("num_days must be positive"));
        }
        self.config.regime_shift.validate()?;
        self.config.momentum.validate()?;
        if market.instrument_count() == 0 {
            return Err(SimError::invalid("market holds no instruments"));
        }
        Ok(())
    }

    /// Simulate `num_days` ticks. Validation happens before any stepping, so
    /// an error leaves the market untouched.
    pub fn run(&mut self, market: &mut Market) -> Result<SimulationOutcome, SimError> {
        self.validate(market)?;

        let DriverConfig { num_days, momentum, regime_shift } = self.config;
        let mut daily_means = Vec::with_capacity(num_days);
        let mut regime_shift_ticks = Vec::new();

        for tick in 0..num_days {
            if regime_shift.is_shift_tick(tick) {
                resample_biases(market, &mut self.rng)?;
                regime_shift_ticks.push(tick);
                debug!(
                    tick,
                    biases = ?market.groups().iter().map(|g| g.bias()).collect::<Vec<_>>(),
                    "regime shift"
                );
            }

            let prices = market.step_all(momentum, &mut self.rng);
            let mean = stats::mean(&prices)
                .ok_or_else(|| SimError::invalid("market produced no prices"))?;
            daily_means.push(mean);
        }

        let final_prices = market.final_prices();
        info!(
            num_days,
            instruments = final_prices.len(),
            shifts = regime_shift_ticks.len(),
            closing_mean = daily_means.last().copied().unwrap_or_default(),
            "simulation complete"
        );

        Ok(SimulationOutcome { daily_means, final_prices, regime_shift_ticks })
    }
}
