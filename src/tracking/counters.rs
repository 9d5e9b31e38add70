//! Raw interaction tallies for the current sampling cycle.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Clicks, keystrokes and focus changes seen since the last cycle boundary.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionCounters {
    pub clicks: u64,
    pub keystrokes: u64,
    pub focus_changes: u64,
}

impl InteractionCounters {
    pub fn new(clicks: u64, keystrokes: u64, focus_changes: u64) -> Self {
        Self {
            clicks,
            keystrokes,
            focus_changes,
        }
    }

    pub fn total(&self) -> u64 {
        self.clicks
            .saturating_add(self.keystrokes)
            .saturating_add(self.focus_changes)
    }
}

/// Shared handle to the live counters.
///
/// Every input source increments through a clone of the same handle; the
/// sampling controller is the only caller of [`CounterHandle::take`].
#[derive(Debug, Clone, Default)]
pub struct CounterHandle {
    inner: Arc<Mutex<InteractionCounters>>,
}

impl CounterHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InteractionCounters> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn on_click(&self) -> InteractionCounters {
        let mut guard = self.lock();
        guard.clicks = guard.clicks.saturating_add(1);
        *guard
    }

    pub fn on_key_press(&self) -> InteractionCounters {
        let mut guard = self.lock();
        guard.keystrokes = guard.keystrokes.saturating_add(1);
        *guard
    }

    pub fn on_focus_change(&self) -> InteractionCounters {
        let mut guard = self.lock();
        guard.focus_changes = guard.focus_changes.saturating_add(1);
        *guard
    }

    pub fn snapshot(&self) -> InteractionCounters {
        *self.lock()
    }

    /// Returns the current tallies and zeroes them under one lock, so an
    /// increment lands either in this cycle or the next, never in neither.
    pub fn take(&self) -> InteractionCounters {
        std::mem::take(&mut *self.lock())
    }

    pub fn reset(&self) {
        *self.lock() = InteractionCounters::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_are_independent() {
        let counters = CounterHandle::new();
        counters.on_click();
        counters.on_click();
        counters.on_key_press();
        let latest = counters.on_focus_change();

        assert_eq!(latest, InteractionCounters::new(2, 1, 1));
        assert_eq!(latest.total(), 4);
    }

    #[test]
    fn take_returns_tallies_and_zeroes() {
        let counters = CounterHandle::new();
        let shared = counters.clone();
        shared.on_click();
        shared.on_key_press();

        assert_eq!(counters.take(), InteractionCounters::new(1, 1, 0));
        assert_eq!(counters.snapshot(), InteractionCounters::default());

        shared.on_focus_change();
        assert_eq!(counters.snapshot().focus_changes, 1);
        counters.reset();
        assert_eq!(shared.snapshot(), InteractionCounters::default());
    }
}
