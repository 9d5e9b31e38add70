use std::time::Duration;

/// Tunables for the per-cycle analysis. Scoring weights and mode thresholds
/// are fixed constants and deliberately not part of this struct.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Length of one sampling cycle.
    pub sampling_interval: Duration,

    /// Records published in the history view after each cycle.
    pub history_limit: u32,

    /// Modes retained by the imbalance detector.
    pub window_capacity: usize,

    /// Identical extreme modes in a row that raise an imbalance alert.
    pub run_length: usize,

    /// How long an imbalance notification stays on screen.
    pub notification_dismiss: Duration,

    /// Records handed to the report generator.
    pub report_window: u32,

    /// Continuous aggressive time before a report is generated automatically.
    pub sustained_aggression: chrono::Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sampling_interval: Duration::from_secs(30),
            history_limit: 10,
            window_capacity: 5,
            run_length: 3,
            notification_dismiss: Duration::from_millis(5_000),
            report_window: 20,
            sustained_aggression: chrono::Duration::minutes(30),
        }
    }
}
