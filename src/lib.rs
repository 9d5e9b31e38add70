pub mod analysis;
pub mod commands;
mod console;
pub mod db;
pub mod events;
pub mod history;
pub mod report;
pub mod scheduler;
pub mod settings;
pub mod tracking;
pub mod utils;

pub use analysis::{classify, intensity_score, AnalysisConfig, Mode};
pub use db::{Database, InteractionRecord};
pub use history::HistoryView;
pub use report::{Report, ReportBackend, ReportGenerator, ReportOptions, ReportSource, ReportStats};
pub use scheduler::{SamplingController, SamplingState, SamplingStatus, TickSource};
pub use settings::{AppSettings, SettingsStore};
pub use tracking::{CounterHandle, InteractionCounters};

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use events::EventBus;
use utils::{Clock, SystemClock};

#[derive(Debug, Parser)]
#[command(name = "personabalance", about = "Samples interaction intensity and tracks your balance")]
pub struct Cli {
    /// Directory holding the database and settings.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Override the sampling window length for this run
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Override the report backend for this run
    #[arg(long, value_enum)]
    pub report_backend: Option<ReportBackend>,
}

pub struct AppState {
    pub sampler: SamplingController,
    pub settings: SettingsStore,
    pub events: EventBus,
}

impl AppState {
    pub fn new(cli: &Cli) -> Result<Self> {
        std::fs::create_dir_all(&cli.data_dir).with_context(|| {
            format!("failed to create data directory {}", cli.data_dir.display())
        })?;

        let settings = SettingsStore::new(cli.data_dir.join("settings.json"))?;

        // CLI overrides apply to this run only.
        let mut effective = settings.get();
        if let Some(secs) = cli.interval_secs {
            effective.sampling.interval_secs = secs;
        }
        if let Some(backend) = cli.report_backend {
            effective.report.backend = backend;
        }

        let db = Database::new(cli.data_dir.join("personabalance.sqlite3"))?;
        Self::assemble(db, settings, &effective)
    }

    /// Throwaway state for tests and demos: in-memory database and default
    /// settings, nothing written to disk.
    pub fn in_memory() -> Result<Self> {
        let settings = SettingsStore::ephemeral();
        let effective = settings.get();
        Self::assemble(Database::in_memory()?, settings, &effective)
    }

    fn assemble(db: Database, settings: SettingsStore, effective: &AppSettings) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let events = EventBus::new();
        let reports = Arc::new(ReportGenerator::new(
            effective.report_options(),
            clock.clone(),
        )?);
        let sampler = SamplingController::new(
            db,
            events.clone(),
            reports,
            clock,
            effective.analysis_config(),
        );

        Ok(Self {
            sampler,
            settings,
            events,
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    utils::logging::init(utils::logging::debug_from_env());

    info!("PersonaBalance starting up...");

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let state = Arc::new(AppState::new(&cli)?);
        if let Some(path) = state.settings.path() {
            info!(
                "Settings at {}; report backend {:?}",
                path.display(),
                state.settings.get().report.backend
            );
        }
        console::run(state).await
    })
}
