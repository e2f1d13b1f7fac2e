//! Validation errors raised while composing a market or starting a run.
//!
//! None of these are retryable: the caller fixes the configuration and starts
//! a new run. Price underflow is not an error (see delisting in `Instrument`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("instrument '{id}' is already present in group '{group}'")]
    DuplicateIdentifier { group: String, id: String },

    #[error("group '{0}' is already present in the market")]
    DuplicateGroupName(String),

    #[error("instrument '{id}' from group '{group}' already belongs to the market")]
    DuplicateInstrumentAcrossGroups { group: String, id: String },

    #[error("invalid simulation parameters: {0}")]
    InvalidSimulationParameters(String),
}

impl SimError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSimulationParameters(reason.into())
    }
}
