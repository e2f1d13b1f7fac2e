use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::distribution::ShockModel;
use crate::error::SimError;

/// Prices below this floor are pinned to zero (delisted).
pub const DELISTING_FLOOR: f64 = 0.01;

/// Momentum memory is clipped to this fraction of the pre-step price.
pub const MOMENTUM_CLAMP_FRACTION: f64 = 0.01;

/// Carry-over of the previous bounded change into the next step.
///
/// `Scaled(k)` adds `last_change * coin * k`, with `coin` a fair draw from
/// `{0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    #[default]
    Off,
    Scaled(f64),
}

impl Momentum {
    /// The whole previous change is carried when the coin lands on one.
    pub const FULL: Momentum = Momentum::Scaled(1.0);

    pub fn new(enabled: bool, scale: f64) -> Self {
        if enabled {
            Momentum::Scaled(scale)
        } else {
            Momentum::Off
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            Momentum::Off => Ok(()),
            Momentum::Scaled(scale) if scale.is_finite() && scale >= 0.0 => Ok(()),
            Momentum::Scaled(scale) => Err(SimError::invalid(format!(
                "momentum scale must be finite and non-negative, got {scale}"
            ))),
        }
    }
}

/// A single simulated stock with its own price path.
///
/// Once the price reaches zero the instrument is delisted: later calls to
/// [`advance`](Self::advance) leave the price at zero but still append to the
/// history, so `history().len() == 1 + steps_applied()` always holds.
#[derive(Debug)]
pub struct Instrument {
    id: String,
    price: f64,
    history: Vec<f64>,
    shock: Box<dyn ShockModel>,
    last_change: f64,
}

impl Instrument {
    /// The instrument's volatility is the width of `shock`.
    pub fn new(
        id: impl Into<String>,
        initial_price: f64,
        shock: Box<dyn ShockModel>,
    ) -> Result<Self, SimError> {
        let id = id.into();
        if !initial_price.is_finite() || initial_price < 0.0 {
            return Err(SimError::invalid(format!(
                "instrument '{id}': initial price must be finite and non-negative, got {initial_price}"
            )));
        }
        let volatility = shock.volatility();
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(SimError::invalid(format!(
                "instrument '{id}': volatility must be finite and non-negative, got {volatility}"
            )));
        }
        Ok(Self {
            id,
            price: initial_price,
            history: vec![initial_price],
            shock,
            last_change: 0.0,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn volatility(&self) -> f64 {
        self.shock.volatility()
    }

    /// Bounded realized delta of the last step, fed back as momentum.
    pub fn last_change(&self) -> f64 {
        self.last_change
    }

    pub fn is_delisted(&self) -> bool {
        self.price == 0.0
    }

    pub fn steps_applied(&self) -> usize {
        self.history.len() - 1
    }

    /// Advance one day under `group_bias`.
    ///
    /// The shock and bias move the price multiplicatively, then momentum adds
    /// its share of the previous bounded change. The stored change is the
    /// realized delta after momentum and the delisting floor, clipped to ±1%
    /// of the pre-step price.
    pub fn advance(&mut self, group_bias: f64, momentum: Momentum, rng: &mut dyn RngCore) {
        if self.is_delisted() {
            self.history.push(0.0);
            return;
        }

        let old_price = self.price;
        let base_move = self.shock.sample(rng) + group_bias;
        let mut new_price = old_price * (1.0 + base_move);

        if let Momentum::Scaled(scale) = momentum {
            let coin = if rng.gen_bool(0.5) { 1.0 } else { 0.0 };
            new_price += self.last_change * coin * scale;
        }

        if new_price < DELISTING_FLOOR {
            new_price = 0.0;
        }

        let bound = MOMENTUM_CLAMP_FRACTION * old_price;
        self.last_change = (new_price - old_price).clamp(-bound, bound);
        self.price = new_price;
        self.history.push(new_price);
    }
}
