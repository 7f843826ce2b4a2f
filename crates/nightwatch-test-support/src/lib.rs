//! Shared test mocks and utilities for the Nightwatch party-game bot.

mod clock;
mod rng;
mod sink;

pub use clock::{FixedClock, ManualClock, fixed_instant};
pub use rng::{MockRng, SequenceRng};
pub use sink::{FailingSink, RecordingSink};
