use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Mode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SamplingStatus {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SamplingState {
    pub status: SamplingStatus,
    pub run_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub cycles_completed: u64,
    pub last_score: Option<u64>,
    pub last_mode: Option<Mode>,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl SamplingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == SamplingStatus::Running
    }

    pub fn begin_run(&mut self, run_id: String, started_at: DateTime<Utc>) {
        *self = Self {
            status: SamplingStatus::Running,
            run_id: Some(run_id),
            started_at: Some(started_at),
            ..Self::default()
        };
    }

    pub fn record_cycle(&mut self, score: u64, mode: Mode, at: DateTime<Utc>) {
        self.cycles_completed = self.cycles_completed.saturating_add(1);
        self.last_score = Some(score);
        self.last_mode = Some(mode);
        self.last_cycle_at = Some(at);
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }
}
