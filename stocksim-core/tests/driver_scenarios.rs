//! Scenario tests for the day loop.
//!
//! Covers the deterministic scenarios:
//! 1. Zero volatility, zero bias: the daily mean never moves
//! 2. A constant -1.0 shock collapses price to zero, which then sticks
//! 3. Regime shifts fire at tick 0 and every period after
//! 4. Invalid parameters fail before any stepping

use rand::rngs::StdRng;
use rand::SeedableRng;
use stocksim_core::{
    ConstantShock, DriftPolicy, DriverConfig, Group, Instrument, Market, Momentum, RegimeShift,
    SimError, SimulationDriver, UniformShock,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn flat_market(size: usize, bias: f64) -> Market {
    let mut group = Group::new("Sector 0", bias).unwrap();
    for i in 0..size {
        let shock = Box::new(UniformShock::new(0.0).unwrap());
        group.add_instrument(Instrument::new(format!("Sector 0 Ticker{i}"), 100.0, shock).unwrap())
            .unwrap();
    }
    let mut market = Market::new();
    market.add_group(group).unwrap();
    market
}

fn driver(config: DriverConfig) -> SimulationDriver {
    SimulationDriver::new(config, StdRng::seed_from_u64(2024))
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn zero_volatility_series_is_flat() {
    let mut market = flat_market(3, 0.0);
    let outcome = driver(DriverConfig::new(5)).run(&mut market).unwrap();

    assert_eq!(outcome.daily_means, vec![100.0; 5]);
    assert_eq!(outcome.final_prices, vec![100.0; 3]);
    for inst in market.all_instruments() {
        assert_eq!(inst.history().len(), 6);
    }
}

#[test]
fn constant_negative_one_shock_collapses() {
    let mut group = Group::new("Sector 0", 0.0).unwrap();
    group
        .add_instrument(Instrument::new("DOOM", 100.0, Box::new(ConstantShock(-1.0))).unwrap())
        .unwrap();
    let mut market = Market::new();
    market.add_group(group).unwrap();

    let config = DriverConfig::new(1).with_regime_shift(RegimeShift::Disabled);
    let outcome = driver(config).run(&mut market).unwrap();
    assert_eq!(outcome.daily_means, vec![0.0]);
    assert_eq!(outcome.final_prices, vec![0.0]);

    let config = DriverConfig::new(4).with_regime_shift(RegimeShift::Disabled);
    driver(config).run(&mut market).unwrap();
    let inst = market.all_instruments()[0];
    assert_eq!(inst.history(), &[100.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn regime_shifts_at_period_boundaries() {
    let mut market = flat_market(2, 0.001);
    let config = DriverConfig::new(100).with_regime_shift(RegimeShift::Every { period: 50 });
    let outcome = driver(config).run(&mut market).unwrap();

    assert_eq!(outcome.regime_shift_ticks, vec![0, 50]);
    assert_eq!(outcome.daily_means.len(), 100);
    assert_eq!(market.groups()[0].original_bias(), 0.001);
}

#[test]
fn regime_shift_count_rounds_down() {
    let mut market = flat_market(1, 0.001);
    let config = DriverConfig::new(149).with_regime_shift(RegimeShift::Every { period: 50 });
    let outcome = driver(config).run(&mut market).unwrap();
    assert_eq!(outcome.regime_shift_ticks, vec![0, 50, 100]);
}

#[test]
fn disabled_regime_shift_keeps_bias() {
    let mut market = flat_market(1, 0.001);
    let config = DriverConfig::new(120).with_regime_shift(RegimeShift::Disabled);
    let outcome = driver(config).run(&mut market).unwrap();
    assert!(outcome.regime_shift_ticks.is_empty());
    assert_eq!(market.groups()[0].bias(), 0.001);
}

#[test]
fn same_seed_same_outcome() {
    let build = || {
        let mut group = Group::new("Sector 0", 0.0005).unwrap();
        for i in 0..20 {
            let shock = Box::new(UniformShock::new(0.03).unwrap());
            group.add_instrument(Instrument::new(format!("T{i}"), 100.0, shock).unwrap()).unwrap();
        }
        let mut market =
            Market::with_drift_policy(DriftPolicy::GaussianDaily { mean: 0.0, stdev: 0.02 }).unwrap();
        market.add_group(group).unwrap();
        market
    };
    let config = DriverConfig::new(60).with_momentum(Momentum::FULL);

    let a = driver(config).run(&mut build()).unwrap();
    let b = driver(config).run(&mut build()).unwrap();
    assert_eq!(a, b);
}

// ── Failure semantics ────────────────────────────────────────────────

#[test]
fn zero_days_rejected_before_stepping() {
    let mut market = flat_market(3, 0.0);
    let err = driver(DriverConfig::new(0)).run(&mut market).unwrap_err();
    assert!(matches!(err, SimError::InvalidSimulationParameters(_)));
    assert!(market.all_instruments().iter().all(|i| i.history().len() == 1));
}

#[test]
fn empty_market_rejected() {
    let mut market = Market::new();
    market.add_group(Group::new("Empty", 0.0).unwrap()).unwrap();
    let err = driver(DriverConfig::new(10)).run(&mut market).unwrap_err();
    assert!(matches!(err, SimError::InvalidSimulationParameters(_)));
}

#[test]
fn negative_momentum_scale_rejected() {
    let mut market = flat_market(2, 0.0);
    let config = DriverConfig::new(10).with_momentum(Momentum::Scaled(-1.0));
    let err = driver(config).run(&mut market).unwrap_err();
    assert!(matches!(err, SimError::InvalidSimulationParameters(_)));
    assert_eq!(market.all_instruments()[0].history().len(), 1);
}

#[test]
fn zero_period_rejected() {
    let mut market = flat_market(1, 0.0);
    let config = DriverConfig::new(10).with_regime_shift(RegimeShift::Every { period: 0 });
    assert!(driver(config).run(&mut market).is_err());
    assert_eq!(market.all_instruments()[0].history().len(), 1);
}
