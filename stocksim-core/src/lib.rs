//! Stocksim Core: stochastic stock-market simulation.
//!
//! This crate contains the simulation model:
//! - Shock models (uniform, Gaussian, constant) behind one trait
//! - Instruments with delisting and scaled, bounded momentum memory
//! - Groups (sectors) sharing a resettable drift
//! - A market of disjoint groups with an optional daily drift policy
//! - The day-loop driver with quarterly regime shifts
//! - Cross-sectional statistics and a deterministic RNG hierarchy

pub mod distribution;
pub mod domain;
pub mod drift;
pub mod engine;
pub mod error;
pub mod rng;
pub mod stats;

pub use distribution::{ConstantShock, GaussianShock, ShockKind, ShockModel, UniformShock};
pub use domain::{Group, Instrument, Market, Momentum};
pub use drift::{DriftPolicy, DriftSampler};
pub use engine::{DriverConfig, RegimeShift, SimulationDriver, SimulationOutcome};
pub use error::SimError;
pub use rng::RngHierarchy;
pub use stats::{HistogramBin, PriceSummary};
