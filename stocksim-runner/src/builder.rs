//! Market generation from a [`SimulationConfig`].

use rand::{Rng, RngCore};

use stocksim_core::{Group, Instrument, Market, SimError};

use crate::config::SimulationConfig;

pub fn group_name(index: usize) -> String {
    format!("Sector {index}")
}

pub fn instrument_id(group: &str, index: usize) -> String {
    format!("{group} Ticker{index}")
}

/// Build `num_groups` sectors of `group_size` instruments each.
///
/// Volatilities are drawn from `Uniform[0, volatility_upper_bound]` using the
/// caller's RNG, so generation is part of the trial's seeded stream. Each
/// shock is `shock_scale` times that draw wide.
pub fn generate_market(config: &SimulationConfig, rng: &mut dyn RngCore) -> Result<Market, SimError> {
    config.validate()?;

    let mut market = Market::with_drift_policy(config.drift_policy())?;
    for g in 0..config.num_groups {
        let name = group_name(g);
        let mut group = Group::new(name.clone(), config.baseline_bias)?;
        for i in 0..config.group_size {
            let volatility = if config.volatility_upper_bound > 0.0 {
                rng.gen_range(0.0..=config.volatility_upper_bound)
            } else {
                0.0
            };
            let shock = config.shock_kind.build(config.shock_width(volatility))?;
            let instrument = Instrument::new(instrument_id(&name, i), config.initial_price, shock)?;
            group.add_instrument(instrument)?;
        }
        market.add_group(group)?;
    }
    Ok(market)
}
