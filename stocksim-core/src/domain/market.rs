use std::collections::HashSet;

use rand::RngCore;

use super::group::Group;
use super::instrument::{Instrument, Momentum};
use crate::drift::{DriftPolicy, DriftSampler};
use crate::error::SimError;

/// The full collection of groups in one simulation run.
///
/// Instrument identifiers are unique across the whole market. `add_group`
/// validates the incoming group completely before touching any state.
#[derive(Debug, Default)]
pub struct Market {
    groups: Vec<Group>,
    ids: HashSet<String>,
    drift_policy: DriftPolicy,
    drift: DriftSampler,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drift_policy(drift_policy: DriftPolicy) -> Result<Self, SimError> {
        let drift = drift_policy.sampler()?;
        Ok(Self { drift_policy, drift, ..Self::default() })
    }

    pub fn drift_policy(&self) -> DriftPolicy {
        self.drift_policy
    }

    pub fn add_group(&mut self, group: Group) -> Result<(), SimError> {
        if self.groups.iter().any(|g| g.name() == group.name()) {
            return Err(SimError::DuplicateGroupName(group.name().to_string()));
        }
        if let Some(id) = group.instrument_ids().find(|id| self.ids.contains(*id)) {
            return Err(SimError::DuplicateInstrumentAcrossGroups {
                group: group.name().to_string(),
                id: id.to_string(),
            });
        }

        self.ids.extend(group.instrument_ids().map(str::to_string));
        self.groups.push(group);
        Ok(())
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }

    pub fn contains_instrument(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn instrument_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// All instruments, group-major then insertion order.
    pub fn all_instruments(&self) -> Vec<&Instrument> {
        self.groups.iter().flat_map(|g| g.instruments()).collect()
    }

    /// Current price of every instrument, group-major.
    pub fn final_prices(&self) -> Vec<f64> {
        self.groups
            .iter()
            .flat_map(|g| g.instruments().iter().map(Instrument::price))
            .collect()
    }

    /// Advance every group one day; prices come back group-major.
    pub fn step_all(&mut self, momentum: Momentum, rng: &mut dyn RngCore) -> Vec<f64> {
        let offset = self.drift.daily_offset(rng);
        let mut prices = Vec::with_capacity(self.instrument_count());
        for group in &mut self.groups {
            prices.extend(group.step_all_with_offset(offset, momentum, rng));
        }
        prices
    }
}
