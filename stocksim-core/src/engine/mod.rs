//! Simulation engine: the day loop and its regime-shift policy.

pub mod driver;
pub mod regime;

pub use driver::{DriverConfig, SimulationDriver, SimulationOutcome};
pub use regime::{resample_biases, RegimeShift, TRADING_DAYS_PER_YEAR};
