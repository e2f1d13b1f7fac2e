//! Independent trials of one configuration.
//!
//! Every trial builds its own market and driver from a sub-seed of the master
//! seed, so trials share no state and can run on any number of threads with
//! identical results.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use stocksim_core::{stats, PriceSummary, RngHierarchy, SimError, SimulationDriver};

use crate::builder::generate_market;
use crate::config::{RunId, SimulationConfig};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Error)]
pub enum TrialError {
    #[error(transparent)]
    Invalid(#[from] SimError),
    #[error("trial count must be positive")]
    NoTrials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialOptions {
    pub trials: usize,
    pub master_seed: u64,
    pub parallel: bool,
    /// Keep every instrument's full price path in the trial reports.
    #[serde(default)]
    pub keep_histories: bool,
}

impl Default for TrialOptions {
    fn default() -> Self {
        Self { trials: 3, master_seed: 42, parallel: true, keep_histories: false }
    }
}

/// One instrument's price path: the initial price then one entry per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePath {
    pub instrument: String,
    pub prices: Vec<f64>,
}

/// Outputs of one trial: the daily mean series and the final cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialReport {
    pub trial: usize,
    pub seed: u64,
    pub daily_means: Vec<f64>,
    pub final_prices: Vec<f64>,
    pub summary: PriceSummary,
    pub regime_shift_ticks: Vec<usize>,
    /// Filled only when [`TrialOptions::keep_histories`] is set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_paths: Vec<PricePath>,
}

impl TrialReport {
    pub fn closing_mean(&self) -> f64 {
        self.daily_means.last().copied().unwrap_or_default()
    }
}

/// All trials of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub master_seed: u64,
    pub config: SimulationConfig,
    pub trials: Vec<TrialReport>,
    /// Mean over trials of each trial's last daily mean.
    pub mean_closing: f64,
}

impl StudyReport {
    /// Day-by-day mean of the trials' daily mean series.
    pub fn average_daily_means(&self) -> Vec<f64> {
        let days = self.config.num_days;
        (0..days)
            .map(|day| {
                let values: Vec<f64> =
                    self.trials.iter().filter_map(|t| t.daily_means.get(day).copied()).collect();
                stats::mean(&values).unwrap_or_default()
            })
            .collect()
    }
}

/// Run a single trial seeded from `hierarchy`.
pub fn run_trial(
    config: &SimulationConfig,
    run_id: &str,
    hierarchy: &RngHierarchy,
    trial: usize,
    keep_histories: bool,
) -> Result<TrialReport, SimError> {
    let seed = hierarchy.sub_seed(run_id, trial as u64);
    let mut rng = hierarchy.rng_for(run_id, trial as u64);

    let mut market = generate_market(config, &mut rng)?;
    let mut driver = SimulationDriver::new(config.driver_config(), rng);
    let outcome = driver.run(&mut market)?;

    let summary = PriceSummary::from_prices(&outcome.final_prices)
        .ok_or_else(|| SimError::InvalidSimulationParameters("market holds no instruments".into()))?;

    if summary.delisted * 2 > summary.count {
        warn!(trial, delisted = summary.delisted, count = summary.count, "majority of instruments delisted");
    }
    info!(trial, seed, closing_mean = summary.mean, "trial complete");

    let price_paths = if keep_histories {
        market
            .all_instruments()
            .into_iter()
            .map(|inst| PricePath { instrument: inst.id().to_string(), prices: inst.history().to_vec() })
            .collect()
    } else {
        Vec::new()
    };

    Ok(TrialReport {
        trial,
        seed,
        daily_means: outcome.daily_means,
        final_prices: outcome.final_prices,
        summary,
        regime_shift_ticks: outcome.regime_shift_ticks,
        price_paths,
    })
}

/// Run `options.trials` independent trials, in parallel unless disabled.
///
/// Configuration is validated once before any trial starts.
pub fn run_trials(config: &SimulationConfig, options: &TrialOptions) -> Result<StudyReport, TrialError> {
    if options.trials == 0 {
        return Err(TrialError::NoTrials);
    }
    config.validate()?;

    let run_id = config.run_id();
    let hierarchy = RngHierarchy::new(options.master_seed);
    info!(%run_id, trials = options.trials, parallel = options.parallel, "starting trials");

    let trials: Vec<TrialReport> = if options.parallel {
        (0..options.trials)
            .into_par_iter()
            .map(|t| run_trial(config, &run_id, &hierarchy, t, options.keep_histories))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        (0..options.trials)
            .map(|t| run_trial(config, &run_id, &hierarchy, t, options.keep_histories))
            .collect::<Result<Vec<_>, _>>()?
    };

    let closings: Vec<f64> = trials.iter().map(TrialReport::closing_mean).collect();
    let mean_closing = stats::mean(&closings).unwrap_or_default();

    Ok(StudyReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        master_seed: options.master_seed,
        config: config.clone(),
        trials,
        mean_closing,
    })
}
