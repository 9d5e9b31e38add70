//! Command surface used by front ends. Errors are rendered to text, the way
//! a UI shows them.

use crate::{
    events::AppEvent,
    history::HistoryView,
    report::Report,
    scheduler::SamplingState,
    tracking::InteractionCounters,
    AppState,
};

pub fn record_click(state: &AppState) -> InteractionCounters {
    let counters = state.sampler.counters().on_click();
    state.events.emit(AppEvent::CountersChanged(counters));
    counters
}

pub fn record_key_press(state: &AppState) -> InteractionCounters {
    let counters = state.sampler.counters().on_key_press();
    state.events.emit(AppEvent::CountersChanged(counters));
    counters
}

pub fn record_focus_change(state: &AppState) -> InteractionCounters {
    let counters = state.sampler.counters().on_focus_change();
    state.events.emit(AppEvent::CountersChanged(counters));
    counters
}

/// Starting twice is harmless; the returned state says whether it was
/// already running.
pub async fn start_analysis(state: &AppState) -> Result<SamplingState, String> {
    state.sampler.start().await;
    Ok(state.sampler.snapshot().await)
}

/// Stops sampling and wipes counters, mode history and stored records.
/// `false` when nothing was running.
pub async fn reset_analysis(state: &AppState) -> Result<bool, String> {
    state.sampler.stop().await.map_err(|e| format!("{e:#}"))
}

pub async fn clear_history(state: &AppState) -> Result<usize, String> {
    state
        .sampler
        .clear_history()
        .await
        .map_err(|e| format!("{e:#}"))
}

pub async fn generate_report(state: &AppState) -> Result<Option<Report>, String> {
    state
        .sampler
        .generate_report()
        .await
        .map_err(|e| format!("{e:#}"))
}

pub async fn get_history(state: &AppState) -> Result<HistoryView, String> {
    state
        .sampler
        .publish_history()
        .await
        .map_err(|e| format!("{e:#}"))
}

pub async fn get_status(state: &AppState) -> SamplingState {
    state.sampler.snapshot().await
}

pub fn get_counters(state: &AppState) -> InteractionCounters {
    state.sampler.counters().snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SamplingStatus;

    #[tokio::test]
    async fn counters_and_lifecycle_through_commands() {
        let state = AppState::in_memory().unwrap();
        let mut events = state.events.subscribe();

        record_click(&state);
        record_key_press(&state);
        let latest = record_focus_change(&state);
        assert_eq!(latest, InteractionCounters::new(1, 1, 1));
        assert_eq!(get_counters(&state), latest);
        assert!(matches!(
            events.recv().await.unwrap(),
            AppEvent::CountersChanged(c) if c == InteractionCounters::new(1, 0, 0)
        ));

        let status = start_analysis(&state).await.unwrap();
        assert_eq!(status.status, SamplingStatus::Running);
        assert!(clear_history(&state).await.is_err());

        assert!(reset_analysis(&state).await.unwrap());
        assert!(!reset_analysis(&state).await.unwrap());
        assert_eq!(get_counters(&state), InteractionCounters::default());
        assert_eq!(get_status(&state).await.status, SamplingStatus::Idle);
        assert!(get_history(&state).await.unwrap().is_empty());
        assert_eq!(generate_report(&state).await.unwrap(), None);
    }
}
