pub mod controller;
pub mod state;
pub mod ticks;

pub use controller::{CycleOutcome, SamplingController};
pub use state::{SamplingState, SamplingStatus};
pub use ticks::{ManualTicks, TickSource};
