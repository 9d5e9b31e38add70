//! User settings persisted as JSON next to the database.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisConfig;
use crate::report::{ReportBackend, ReportOptions};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SamplingSettings {
    pub interval_secs: u64,
    pub history_limit: u32,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            history_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ImbalanceSettings {
    pub window_capacity: usize,
    pub run_length: usize,
    pub notification_dismiss_ms: u64,
}

impl Default for ImbalanceSettings {
    fn default() -> Self {
        Self {
            window_capacity: 5,
            run_length: 3,
            notification_dismiss_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportSettings {
    pub backend: ReportBackend,
    pub openai_endpoint: String,
    pub openai_model: String,
    pub huggingface_endpoint: String,
    pub window: u32,
    pub timeout_secs: u64,
    pub sustained_aggression_mins: i64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        let options = ReportOptions::default();
        Self {
            backend: options.backend,
            openai_endpoint: options.openai_endpoint,
            openai_model: options.openai_model,
            huggingface_endpoint: options.huggingface_endpoint,
            window: 20,
            timeout_secs: options.timeout.as_secs(),
            sustained_aggression_mins: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub sampling: SamplingSettings,
    pub imbalance: ImbalanceSettings,
    pub report: ReportSettings,
}

impl AppSettings {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            sampling_interval: Duration::from_secs(self.sampling.interval_secs.max(1)),
            history_limit: self.sampling.history_limit.max(1),
            window_capacity: self.imbalance.window_capacity,
            run_length: self.imbalance.run_length,
            notification_dismiss: Duration::from_millis(self.imbalance.notification_dismiss_ms),
            report_window: self.report.window.max(1),
            sustained_aggression: chrono::Duration::minutes(
                self.report.sustained_aggression_mins.max(1),
            ),
        }
    }

    /// API keys come from the environment and are never written to disk.
    pub fn report_options(&self) -> ReportOptions {
        let api_key = match self.report.backend {
            ReportBackend::Simulated => None,
            ReportBackend::OpenAi => std::env::var("OPENAI_API_KEY").ok(),
            ReportBackend::HuggingFace => std::env::var("HUGGINGFACE_API_KEY").ok(),
        };

        ReportOptions {
            backend: self.report.backend,
            openai_endpoint: self.report.openai_endpoint.clone(),
            openai_model: self.report.openai_model.clone(),
            huggingface_endpoint: self.report.huggingface_endpoint.clone(),
            api_key,
            timeout: Duration::from_secs(self.report.timeout_secs.max(1)),
        }
    }
}

pub struct SettingsStore {
    /// `None` for a store that lives only in memory.
    path: Option<PathBuf>,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Loads `path`, or defaults when it is missing or unreadable JSON. The
    /// file is (re)written so a fresh data directory shows every knob.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring malformed settings at {}: {err}; using defaults",
                    path.display()
                );
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };

        let store = Self {
            path: Some(path),
            data: RwLock::new(data),
        };
        store.persist(&store.read())?;
        Ok(store)
    }

    /// Defaults held in memory; updates are never written anywhere.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            data: RwLock::new(AppSettings::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, AppSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn get(&self) -> AppSettings {
        self.read().clone()
    }

    pub fn update<F>(&self, apply: F) -> Result<AppSettings>
    where
        F: FnOnce(&mut AppSettings),
    {
        let mut guard = self.write();
        apply(&mut guard);
        self.persist(&guard)?;
        Ok(guard.clone())
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
