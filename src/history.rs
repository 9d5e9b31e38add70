use serde::Serialize;

use crate::db::InteractionRecord;

pub const EMPTY_HISTORY_TEXT: &str = "No records yet.";

/// Most recent records, newest first, as shown in the history panel.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub records: Vec<InteractionRecord>,
}

impl HistoryView {
    pub fn new(records: Vec<InteractionRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One line per record, or the explicit empty-state line.
    pub fn render_lines(&self) -> Vec<String> {
        if self.records.is_empty() {
            return vec![EMPTY_HISTORY_TEXT.to_string()];
        }

        self.records
            .iter()
            .map(|record| {
                format!(
                    "{}  {:<10} score {:>3}  C:{} K:{} F:{}",
                    record.timestamp.format("%H:%M:%S"),
                    record.mode.as_str(),
                    record.score,
                    record.click_count,
                    record.key_count,
                    record.focus_count
                )
            })
            .collect()
    }
}
