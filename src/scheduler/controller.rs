use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    analysis::{
        AnalysisConfig, ImbalanceAlert, ImbalanceDetector, Mode, SustainedAggressionTrigger,
    },
    db::{Database, InteractionRecord},
    events::{AppEvent, EventBus, Notification},
    history::HistoryView,
    report::{Report, ReportGenerator},
    tracking::{CounterHandle, InteractionCounters},
    utils::Clock,
};

use super::{
    ticks::{TickSource, Ticker},
    SamplingState,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Result of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub record: InteractionRecord,
    pub alert: Option<ImbalanceAlert>,
}

struct Worker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

struct AnalysisState {
    detector: ImbalanceDetector,
    sustained: SustainedAggressionTrigger,
}

impl AnalysisState {
    fn new(config: &AnalysisConfig) -> Self {
        Self {
            detector: ImbalanceDetector::new(config.window_capacity, config.run_length),
            sustained: SustainedAggressionTrigger::new(config.sustained_aggression),
        }
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.sustained.reset();
    }
}

/// Drives the sampling cycle: every tick the live counters are scored,
/// classified, checked for imbalance, persisted, and the history view is
/// republished.
#[derive(Clone)]
pub struct SamplingController {
    state: Arc<Mutex<SamplingState>>,
    analysis: Arc<Mutex<AnalysisState>>,
    worker: Arc<Mutex<Option<Worker>>>,
    counters: CounterHandle,
    db: Database,
    events: EventBus,
    reports: Arc<ReportGenerator>,
    clock: Arc<dyn Clock>,
    ticks: TickSource,
    config: Arc<AnalysisConfig>,
}

impl SamplingController {
    pub fn new(
        db: Database,
        events: EventBus,
        reports: Arc<ReportGenerator>,
        clock: Arc<dyn Clock>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SamplingState::new())),
            analysis: Arc::new(Mutex::new(AnalysisState::new(&config))),
            worker: Arc::new(Mutex::new(None)),
            counters: CounterHandle::new(),
            db,
            events,
            reports,
            clock,
            ticks: TickSource::Interval(config.sampling_interval),
            config: Arc::new(config),
        }
    }

    pub fn with_tick_source(mut self, ticks: TickSource) -> Self {
        self.ticks = ticks;
        self
    }

    /// Handle for input sources; increments land in the current cycle.
    pub fn counters(&self) -> CounterHandle {
        self.counters.clone()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub async fn snapshot(&self) -> SamplingState {
        self.state.lock().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.worker.lock().await.is_some()
    }

    pub async fn recent_modes(&self) -> Vec<Mode> {
        self.analysis.lock().await.detector.recent_modes()
    }

    /// Starts the recurring tick. Returns `false` when already running.
    pub async fn start(&self) -> bool {
        let mut worker_guard = self.worker.lock().await;
        if worker_guard.is_some() {
            log_info!("Analysis already running");
            return false;
        }

        let run_id = Uuid::new_v4().to_string();
        self.state
            .lock()
            .await
            .begin_run(run_id.clone(), self.clock.now());

        let ticker = self.ticks.ticker().await;
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(sampling_loop(self.clone(), ticker, cancel_token.clone()));

        *worker_guard = Some(Worker {
            handle,
            cancel_token,
        });
        drop(worker_guard);

        log_info!(
            "Analysis started (run {run_id}, {}s windows)",
            self.config.sampling_interval.as_secs()
        );
        self.emit_status().await;
        true
    }

    /// Cancels the tick, zeroes counters and mode history, and wipes the
    /// store. Returns `false` (and touches nothing) when idle. No cycle runs
    /// after this returns.
    pub async fn stop(&self) -> Result<bool> {
        let mut worker_guard = self.worker.lock().await;
        let Some(worker) = worker_guard.take() else {
            return Ok(false);
        };
        self.halt(worker).await;

        let removed = self
            .db
            .clear_interaction_records()
            .await
            .context("failed to clear records on reset")?;
        log_info!("Analysis stopped; {removed} records cleared");

        self.publish_history().await?;
        drop(worker_guard);
        Ok(true)
    }

    /// Stops the tick for process exit. Persisted records are kept so the
    /// next start-up shows them. Returns `false` when idle.
    pub async fn shutdown(&self) -> bool {
        let mut worker_guard = self.worker.lock().await;
        let Some(worker) = worker_guard.take() else {
            return false;
        };
        self.halt(worker).await;
        log_info!("Analysis shut down; records kept");
        true
    }

    async fn halt(&self, worker: Worker) {
        worker.cancel_token.cancel();
        if let Err(err) = worker.handle.await {
            log_error!("sampling loop task failed to join: {err}");
        }

        self.counters.reset();
        self.events
            .emit(AppEvent::CountersChanged(InteractionCounters::default()));
        self.analysis.lock().await.reset();
        self.state.lock().await.stop();
        self.emit_status().await;
    }

    /// Erases persisted records while sampling is stopped.
    pub async fn clear_history(&self) -> Result<usize> {
        let worker_guard = self.worker.lock().await;
        if worker_guard.is_some() {
            bail!("stop the analysis before clearing history");
        }

        let removed = self.db.clear_interaction_records().await?;
        self.publish_history().await?;
        drop(worker_guard);
        Ok(removed)
    }

    /// One full cycle. Counters are taken (and zeroed) up front so input
    /// arriving while the record is written counts toward the next cycle.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let counters = self.counters.take();
        let now = self.clock.now();
        let record = InteractionRecord::from_counters(now, counters);
        let (score, mode) = (record.score, record.mode);

        self.events
            .emit(AppEvent::CountersChanged(InteractionCounters::default()));
        self.events.emit(AppEvent::ModeUpdated {
            score,
            mode,
            counters,
        });
        self.state.lock().await.record_cycle(score, mode, now);

        let (alert, sustained) = {
            let mut analysis = self.analysis.lock().await;
            (
                analysis.detector.observe(mode),
                analysis.sustained.observe(mode, now),
            )
        };

        if let Some(alert) = alert {
            log_warn!("Imbalance: {} for {} cycles", alert.mode, alert.run_length);
            self.events
                .emit(AppEvent::ImbalanceDetected(self.notification_for(alert)));
        }

        if sustained {
            log_warn!("Sustained aggressive activity; generating report");
            self.spawn_report();
        }

        log_info!(
            "Cycle completed | score={score} | mode={mode} (click={}, key={}, focus={})",
            counters.clicks,
            counters.keystrokes,
            counters.focus_changes
        );

        let stored = self
            .db
            .append_interaction_record(&record)
            .await
            .context("failed to persist cycle record")?;

        self.publish_history().await?;

        Ok(CycleOutcome {
            record: stored,
            alert,
        })
    }

    /// Reads the most recent records and pushes them to the history view.
    pub async fn publish_history(&self) -> Result<HistoryView> {
        let records = self
            .db
            .recent_interaction_records(self.config.history_limit)
            .await
            .context("failed to load history")?;
        let view = HistoryView::new(records);
        self.events.emit(AppEvent::HistoryUpdated(view.clone()));
        Ok(view)
    }

    /// Builds a report from the report window. `None` when there are too few
    /// records.
    pub async fn generate_report(&self) -> Result<Option<Report>> {
        let records = self
            .db
            .recent_interaction_records(self.config.report_window)
            .await
            .context("failed to load records for report")?;

        let report = self.reports.generate(&records).await;
        match &report {
            Some(report) => self.events.emit(AppEvent::ReportReady(report.clone())),
            None => self.events.emit(AppEvent::ReportUnavailable {
                records_available: records.len(),
            }),
        }
        Ok(report)
    }

    fn spawn_report(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            if let Err(err) = controller.generate_report().await {
                log_error!("automatic report failed: {err:#}");
            }
        });
    }

    fn notification_for(&self, alert: ImbalanceAlert) -> Notification {
        let message = match alert.mode {
            Mode::Aggressive => format!(
                "Activity has been aggressive for {} cycles in a row. Consider a short break.",
                alert.run_length
            ),
            Mode::Calm => format!(
                "Activity has been calm for {} cycles in a row. A small goal might help you get going.",
                alert.run_length
            ),
            // The detector only tracks extreme modes.
            Mode::Balanced => format!(
                "Activity has been balanced for {} cycles in a row.",
                alert.run_length
            ),
        };

        Notification {
            mode: alert.mode,
            title: format!("{} mode imbalance", alert.mode),
            message,
            dismiss_after_ms: self.config.notification_dismiss.as_millis() as u64,
        }
    }

    async fn emit_status(&self) {
        let state = self.state.lock().await.clone();
        self.events.emit(AppEvent::StatusChanged(state));
    }
}

async fn sampling_loop(
    controller: SamplingController,
    mut ticker: Ticker,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("sampling loop shutting down");
                break;
            }
            ticked = ticker.tick() => {
                if !ticked {
                    log_warn!("tick source closed; sampling loop exiting");
                    break;
                }
                if let Err(err) = controller.run_cycle().await {
                    log_error!("sampling cycle failed: {err:#}");
                }
            }
        }
    }
}
