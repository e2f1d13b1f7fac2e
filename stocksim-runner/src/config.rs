//! Serializable simulation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stocksim_core::{DriftPolicy, DriverConfig, Momentum, RegimeShift, ShockKind, SimError};

/// Unique identifier for a configuration (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Invalid(#[from] SimError),
    #[error("unknown preset '{0}' (expected one of: {presets})", presets = PRESET_NAMES.join(", "))]
    UnknownPreset(String),
}

/// Mean and standard deviation of the market-wide daily drift draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBiasRange {
    pub mean: f64,
    pub stdev: f64,
}

/// Everything needed to build and run one simulated market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_days: usize,
    pub num_groups: usize,
    pub group_size: usize,
    /// Drift every sector starts from (and regime shifts wander around).
    pub baseline_bias: f64,
    /// Instrument volatilities are drawn from `Uniform[0, upper bound]`.
    pub volatility_upper_bound: f64,
    #[serde(default)]
    pub momentum_enabled: bool,
    /// Share of the previous bounded change carried when the coin lands on one.
    #[serde(default = "default_scale")]
    pub momentum_scale: f64,
    #[serde(default = "default_initial_price")]
    pub initial_price: f64,
    #[serde(default)]
    pub shock_kind: ShockKind,
    /// Shock width as a multiple of each instrument's drawn volatility.
    #[serde(default = "default_scale")]
    pub shock_scale: f64,
    #[serde(default = "default_true")]
    pub regime_shifts: bool,
    #[serde(default = "default_trading_days_per_year")]
    pub trading_days_per_year: usize,
    /// Shared Gaussian daily drift; absent means sectors move on their own bias.
    #[serde(default)]
    pub daily_bias_range: Option<DailyBiasRange>,
}

fn default_scale() -> f64 {
    1.0
}

fn default_initial_price() -> f64 {
    100.0
}

fn default_true() -> bool {
    true
}

fn default_trading_days_per_year() -> usize {
    stocksim_core::engine::TRADING_DAYS_PER_YEAR
}

pub const PRESET_NAMES: [&str; 3] = ["sector_study", "daily_bias_study", "random_walk_study"];

impl SimulationConfig {
    /// Five sectors of 500 stocks over 500 days with quarterly regime shifts.
    pub fn sector_study() -> Self {
        Self {
            num_days: 500,
            num_groups: 5,
            group_size: 500,
            baseline_bias: 0.11 / 2000.0,
            volatility_upper_bound: 0.04,
            momentum_enabled: false,
            momentum_scale: default_scale(),
            initial_price: default_initial_price(),
            shock_kind: ShockKind::Uniform,
            shock_scale: default_scale(),
            regime_shifts: true,
            trading_days_per_year: default_trading_days_per_year(),
            daily_bias_range: None,
        }
    }

    /// One 500-stock market with Gaussian shocks, damped momentum, and a
    /// shared Gaussian daily drift on top of the baseline.
    pub fn daily_bias_study() -> Self {
        let days_per_year = 200.0;
        Self {
            num_days: 200,
            num_groups: 1,
            group_size: 500,
            baseline_bias: 0.1 / days_per_year,
            volatility_upper_bound: 12.0 / days_per_year,
            momentum_enabled: true,
            momentum_scale: 1.1 / days_per_year,
            initial_price: default_initial_price(),
            shock_kind: ShockKind::Gaussian,
            shock_scale: default_scale(),
            regime_shifts: false,
            trading_days_per_year: default_trading_days_per_year(),
            daily_bias_range: Some(DailyBiasRange { mean: 0.0, stdev: 4.0 / days_per_year }),
        }
    }

    /// Twenty driftless random walks over 100 days.
    pub fn random_walk_study() -> Self {
        Self {
            num_days: 100,
            num_groups: 1,
            group_size: 20,
            baseline_bias: 0.0,
            volatility_upper_bound: 0.20,
            momentum_enabled: false,
            momentum_scale: default_scale(),
            initial_price: default_initial_price(),
            shock_kind: ShockKind::Uniform,
            shock_scale: default_scale(),
            regime_shifts: false,
            trading_days_per_year: default_trading_days_per_year(),
            daily_bias_range: None,
        }
    }

    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "sector_study" => Ok(Self::sector_study()),
            "daily_bias_study" => Ok(Self::daily_bias_study()),
            "random_walk_study" => Ok(Self::random_walk_study()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |reason: String| Err(SimError::InvalidSimulationParameters(reason));

        if self.num_days == 0 {
            return invalid("num_days must be positive".into());
        }
        if self.num_groups == 0 {
            return invalid("num_groups must be positive".into());
        }
        if self.group_size == 0 {
            return invalid("group_size must be positive".into());
        }
        if !self.baseline_bias.is_finite() {
            return invalid(format!("baseline_bias must be finite, got {}", self.baseline_bias));
        }
        if !self.volatility_upper_bound.is_finite() || self.volatility_upper_bound < 0.0 {
            return invalid(format!(
                "volatility_upper_bound must be finite and non-negative, got {}",
                self.volatility_upper_bound
            ));
        }
        if !self.initial_price.is_finite() || self.initial_price <= 0.0 {
            return invalid(format!("initial_price must be positive, got {}", self.initial_price));
        }
        if !self.shock_scale.is_finite() || self.shock_scale < 0.0 {
            return invalid(format!(
                "shock_scale must be finite and non-negative, got {}",
                self.shock_scale
            ));
        }
        Momentum::Scaled(self.momentum_scale).validate()?;
        self.drift_policy().validate()?;
        self.regime_shift().validate()?;
        Ok(())
    }

    pub fn drift_policy(&self) -> DriftPolicy {
        match self.daily_bias_range {
            Some(DailyBiasRange { mean, stdev }) => DriftPolicy::GaussianDaily { mean, stdev },
            None => DriftPolicy::None,
        }
    }

    pub fn momentum(&self) -> Momentum {
        Momentum::new(self.momentum_enabled, self.momentum_scale)
    }

    /// Shock width for an instrument whose volatility draw came out at `volatility`.
    pub fn shock_width(&self, volatility: f64) -> f64 {
        volatility * self.shock_scale
    }

    pub fn regime_shift(&self) -> RegimeShift {
        if self.regime_shifts {
            RegimeShift::quarterly(self.trading_days_per_year)
        } else {
            RegimeShift::Disabled
        }
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::new(self.num_days)
            .with_momentum(self.momentum())
            .with_regime_shift(self.regime_shift())
    }

    pub fn instrument_count(&self) -> usize {
        self.num_groups * self.group_size
    }

    /// Deterministic hash of this configuration.
    ///
    /// Two identical configurations share a run id, which in turn keys the
    /// per-trial seed derivation.
    pub fn run_id(&self) -> RunId {
        // Serializing plain numbers, bools and enums cannot fail; an empty
        // payload would still hash deterministically.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
