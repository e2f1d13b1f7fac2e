use std::collections::HashSet;

use rand::RngCore;

use super::instrument::{Instrument, Momentum};
use crate::error::SimError;

/// A named sector of instruments sharing one drift value.
///
/// `original_bias` is fixed at construction and anchors regime shifts;
/// `bias` is the drift currently applied to every member.
#[derive(Debug)]
pub struct Group {
    name: String,
    instruments: Vec<Instrument>,
    ids: HashSet<String>,
    bias: f64,
    original_bias: f64,
}

impl Group {
    pub fn new(name: impl Into<String>, bias: f64) -> Result<Self, SimError> {
        let name = name.into();
        if !bias.is_finite() {
            return Err(SimError::invalid(format!("group '{name}': bias must be finite, got {bias}")));
        }
        Ok(Self { name, instruments: Vec::new(), ids: HashSet::new(), bias, original_bias: bias })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_instrument(&mut self, instrument: Instrument) -> Result<(), SimError> {
        if self.ids.contains(instrument.id()) {
            return Err(SimError::DuplicateIdentifier {
                group: self.name.clone(),
                id: instrument.id().to_string(),
            });
        }
        self.ids.insert(instrument.id().to_string());
        self.instruments.push(instrument);
        Ok(())
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) -> Result<(), SimError> {
        if !bias.is_finite() {
            return Err(SimError::invalid(format!(
                "group '{}': bias must be finite, got {bias}",
                self.name
            )));
        }
        self.bias = bias;
        Ok(())
    }

    pub fn original_bias(&self) -> f64 {
        self.original_bias
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Instrument identifiers in insertion order.
    pub fn instrument_ids(&self) -> impl Iterator<Item = &str> {
        self.instruments.iter().map(|i| i.id())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Advance every instrument under the group's bias, in insertion order.
    pub fn step_all(&mut self, momentum: Momentum, rng: &mut dyn RngCore) -> Vec<f64> {
        self.step_all_with_offset(0.0, momentum, rng)
    }

    /// Like [`step_all`](Self::step_all) with `extra_bias` added to the
    /// group's drift for this step only.
    pub fn step_all_with_offset(
        &mut self,
        extra_bias: f64,
        momentum: Momentum,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let drift = self.bias + extra_bias;
        let mut prices = Vec::with_capacity(self.instruments.len());
        for inst in &mut self.instruments {
            inst.advance(drift, momentum, rng);
            prices.push(inst.price());
        }
        prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::ConstantShock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inst(id: &str, shock: f64) -> Instrument {
        Instrument::new(id, 100.0, Box::new(ConstantShock(shock))).unwrap()
    }

    #[test]
    fn duplicate_identifier_rejected() {
        let mut g = Group::new("Tech", 0.0).unwrap();
        g.add_instrument(inst("AAA", 0.0)).unwrap();
        let err = g.add_instrument(inst("AAA", 0.0)).unwrap_err();
        assert_eq!(err, SimError::DuplicateIdentifier { group: "Tech".into(), id: "AAA".into() });
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn step_all_preserves_insertion_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut g = Group::new("Tech", 0.0).unwrap();
        g.add_instrument(inst("C", 0.03)).unwrap();
        g.add_instrument(inst("A", -0.01)).unwrap();
        g.add_instrument(inst("B", 0.0)).unwrap();

        let prices = g.step_all(Momentum::Off, &mut rng);
        assert_eq!(prices.len(), 3);
        assert!((prices[0] - 103.0).abs() < 1e-9);
        assert!((prices[1] - 99.0).abs() < 1e-9);
        assert!((prices[2] - 100.0).abs() < 1e-9);
        assert_eq!(g.instrument_ids().collect::<Vec<_>>(), vec!["C", "A", "B"]);
    }

    #[test]
    fn bias_applies_to_every_member() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut g = Group::new("Energy", 0.01).unwrap();
        g.add_instrument(inst("X", 0.0)).unwrap();
        g.add_instrument(inst("Y", 0.0)).unwrap();
        let prices = g.step_all(Momentum::Off, &mut rng);
        assert!(prices.iter().all(|p| (p - 101.0).abs() < 1e-9));
    }

    #[test]
    fn offset_is_transient() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut g = Group::new("Energy", 0.01).unwrap();
        g.add_instrument(inst("X", 0.0)).unwrap();
        let prices = g.step_all_with_offset(0.02, Momentum::Off, &mut rng);
        assert!((prices[0] - 103.0).abs() < 1e-9);
        assert_eq!(g.bias(), 0.01);
    }

    #[test]
    fn set_bias_keeps_original() {
        let mut g = Group::new("Tech", 0.002).unwrap();
        g.set_bias(-0.5).unwrap();
        assert_eq!(g.bias(), -0.5);
        assert_eq!(g.original_bias(), 0.002);
        assert!(g.set_bias(f64::NAN).is_err());
        assert_eq!(g.bias(), -0.5);
    }
}
