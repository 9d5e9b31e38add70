pub mod counters;

pub use counters::{CounterHandle, InteractionCounters};
