//! One completed sampling cycle, as stored in `interaction_summary`.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{classify, intensity_score, Mode};
use crate::tracking::InteractionCounters;

/// Immutable once created; `score` and `mode` are derived from the counts at
/// creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    /// Assigned by the store; `None` until persisted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub click_count: u64,
    pub key_count: u64,
    pub focus_count: u64,
    pub score: u64,
    pub mode: Mode,
}

impl InteractionRecord {
    pub fn from_counters(timestamp: DateTime<Utc>, counters: InteractionCounters) -> Self {
        let score = intensity_score(&counters);
        Self {
            id: None,
            timestamp,
            click_count: counters.clicks,
            key_count: counters.keystrokes,
            focus_count: counters.focus_changes,
            score,
            mode: classify(score),
        }
    }

    pub fn counters(&self) -> InteractionCounters {
        InteractionCounters::new(self.click_count, self.key_count, self.focus_count)
    }

    pub fn total_interactions(&self) -> u64 {
        self.counters().total()
    }

    /// Rejects a record whose `score` or `mode` disagrees with its counts.
    pub fn validate(&self) -> Result<()> {
        let expected_score = intensity_score(&self.counters());
        if self.score != expected_score {
            bail!(
                "score {} does not match counts (expected {expected_score})",
                self.score
            );
        }
        let expected_mode = classify(self.score);
        if self.mode != expected_mode {
            bail!(
                "mode {} does not match score {} (expected {expected_mode})",
                self.mode,
                self.score
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn derives_score_and_mode() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let record = InteractionRecord::from_counters(ts, InteractionCounters::new(10, 5, 2));
        assert_eq!(record.score, 31);
        assert_eq!(record.mode, Mode::Balanced);
        assert_eq!(record.total_interactions(), 17);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn detects_tampered_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut record = InteractionRecord::from_counters(ts, InteractionCounters::new(1, 1, 1));
        record.score = 99;
        assert!(record.validate().is_err());

        let mut record = InteractionRecord::from_counters(ts, InteractionCounters::new(1, 1, 1));
        record.mode = Mode::Aggressive;
        assert!(record.validate().is_err());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let record = InteractionRecord::from_counters(ts, InteractionCounters::new(0, 0, 0));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["clickCount"], 0);
        assert_eq!(json["mode"], "Calm");
        assert!(json.get("id").is_none());
    }
}
