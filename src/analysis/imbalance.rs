//! Debounced detection of a run of identical extreme modes.
//!
//! The detector keeps a short FIFO of recent modes and a counter of how many
//! identical extreme modes arrived in a row. When the counter reaches the run
//! length it fires once and starts over from zero, so staying in the same
//! extreme re-announces only after another full run.

use std::collections::VecDeque;

use serde::Serialize;

use super::Mode;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImbalanceAlert {
    pub mode: Mode,
    pub run_length: usize,
}

#[derive(Debug, Clone)]
pub struct ImbalanceDetector {
    window: VecDeque<Mode>,
    capacity: usize,
    run_length: usize,
    consecutive: usize,
}

impl Default for ImbalanceDetector {
    fn default() -> Self {
        Self::new(5, 3)
    }
}

impl ImbalanceDetector {
    /// `capacity` is raised to `run_length` when smaller; a run must fit in the window.
    pub fn new(capacity: usize, run_length: usize) -> Self {
        let run_length = run_length.max(1);
        let capacity = capacity.max(run_length);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            run_length,
            consecutive: 0,
        }
    }

    pub fn observe(&mut self, mode: Mode) -> Option<ImbalanceAlert> {
        let previous = self.window.back().copied();

        self.window.push_back(mode);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }

        self.consecutive = if !mode.is_extreme() {
            0
        } else if previous == Some(mode) {
            self.consecutive + 1
        } else {
            1
        };

        if self.consecutive >= self.run_length && self.tail_matches(mode) {
            self.consecutive = 0;
            return Some(ImbalanceAlert {
                mode,
                run_length: self.run_length,
            });
        }

        None
    }

    fn tail_matches(&self, mode: Mode) -> bool {
        self.window.len() >= self.run_length
            && self
                .window
                .iter()
                .rev()
                .take(self.run_length)
                .all(|entry| *entry == mode)
    }

    /// Oldest first.
    pub fn recent_modes(&self) -> Vec<Mode> {
        self.window.iter().copied().collect()
    }

    pub fn consecutive(&self) -> usize {
        self.consecutive
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.consecutive = 0;
    }
}
