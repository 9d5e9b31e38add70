use serde::{Deserialize, Serialize};

use crate::analysis::Mode;
use crate::db::InteractionRecord;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModeCounts {
    pub calm: u64,
    pub balanced: u64,
    pub aggressive: u64,
}

impl ModeCounts {
    pub fn get(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Calm => self.calm,
            Mode::Balanced => self.balanced,
            Mode::Aggressive => self.aggressive,
        }
    }

    fn bump(&mut self, mode: Mode) {
        match mode {
            Mode::Calm => self.calm += 1,
            Mode::Balanced => self.balanced += 1,
            Mode::Aggressive => self.aggressive += 1,
        }
    }
}

/// Aggregates over the records a report was built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_cycles: u64,
    pub mode_counts: ModeCounts,
    /// Mean score, rounded half away from zero.
    pub average_score: u64,
    /// Clicks + keystrokes + focus changes over all records.
    pub total_interactions: u64,
}

impl ReportStats {
    pub fn from_records(records: &[InteractionRecord]) -> Self {
        let mut mode_counts = ModeCounts::default();
        let mut score_sum: u64 = 0;
        let mut total_interactions: u64 = 0;

        for record in records {
            mode_counts.bump(record.mode);
            score_sum = score_sum.saturating_add(record.score);
            total_interactions = total_interactions.saturating_add(record.total_interactions());
        }

        let total_cycles = records.len() as u64;
        let average_score = if total_cycles == 0 {
            0
        } else {
            (score_sum as f64 / total_cycles as f64).round() as u64
        };

        Self {
            total_cycles,
            mode_counts,
            average_score,
            total_interactions,
        }
    }

    /// Share of cycles in `mode`, as a rounded percentage.
    pub fn percentage(&self, mode: Mode) -> u64 {
        if self.total_cycles == 0 {
            return 0;
        }
        (self.mode_counts.get(mode) as f64 * 100.0 / self.total_cycles as f64).round() as u64
    }

    /// `Aggressive` or `Calm` when strictly ahead of both others, else `Balanced`.
    pub fn dominant_mode(&self) -> Mode {
        let ModeCounts {
            calm,
            balanced,
            aggressive,
        } = self.mode_counts;

        if aggressive > balanced && aggressive > calm {
            Mode::Aggressive
        } else if calm > balanced && calm > aggressive {
            Mode::Calm
        } else {
            Mode::Balanced
        }
    }
}
