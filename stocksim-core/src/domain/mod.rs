//! Domain types: instruments, groups (sectors), and the market.

pub mod group;
pub mod instrument;
pub mod market;

pub use group::Group;
pub use instrument::{Instrument, Momentum, DELISTING_FLOOR, MOMENTUM_CLAMP_FRACTION};
pub use market::Market;
