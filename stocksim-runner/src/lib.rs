//! Stocksim Runner: orchestration around `stocksim-core`.
//!
//! This crate provides:
//! - TOML simulation configuration with named presets
//! - Ordered text-line parameter records
//! - Market generation from configuration
//! - Independent, seed-reproducible trials (parallel via rayon)
//! - Report export (JSON, CSV, Markdown) and artifact directories

pub mod builder;
pub mod config;
pub mod records;
pub mod reporting;
pub mod trials;

pub use builder::generate_market;
pub use config::{ConfigError, DailyBiasRange, RunId, SimulationConfig, PRESET_NAMES};
pub use records::{
    default_template, load_records, parse_records, ParameterRecord, RecordError,
    GAUSSIAN_SHOCK_SCALE,
};
pub use reporting::{save_artifacts, ArtifactPaths, RunManifest};
pub use trials::{
    run_trial, run_trials, PricePath, StudyReport, TrialError, TrialOptions, TrialReport,
};
