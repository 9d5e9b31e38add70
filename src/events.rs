//! Application events pushed to whichever front end is attached.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::analysis::Mode;
use crate::history::HistoryView;
use crate::report::Report;
use crate::scheduler::SamplingState;
use crate::tracking::InteractionCounters;

const EVENT_BUFFER: usize = 64;

/// Advisory toast; the front end hides it after `dismiss_after_ms`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub mode: Mode,
    pub title: String,
    pub message: String,
    pub dismiss_after_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum AppEvent {
    CountersChanged(InteractionCounters),
    ModeUpdated {
        score: u64,
        mode: Mode,
        counters: InteractionCounters,
    },
    ImbalanceDetected(Notification),
    HistoryUpdated(HistoryView),
    ReportReady(Report),
    ReportUnavailable {
        records_available: usize,
    },
    StatusChanged(SamplingState),
}

/// Fan-out of [`AppEvent`]s. Emitting with no subscribers is not an error.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }
}
