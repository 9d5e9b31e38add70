//! Balance reports over a window of persisted records.
//!
//! A hosted backend may write the text; when it is unconfigured, slow or
//! broken, the report is rendered locally from the same statistics.

pub mod local;
pub mod remote;
pub mod stats;

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::db::InteractionRecord;
use crate::utils::Clock;

pub use local::render_local_report;
pub use stats::{ModeCounts, ReportStats};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Fewer records than this produce no report.
pub const MIN_RECORDS_FOR_REPORT: usize = 5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportBackend {
    /// Local report only.
    #[default]
    Simulated,
    /// OpenAI-compatible chat completions endpoint.
    #[value(name = "openai")]
    OpenAi,
    /// Hugging Face inference endpoint.
    #[value(name = "huggingface")]
    HuggingFace,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Local,
    OpenAi,
    HuggingFace,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub stats: ReportStats,
    pub source: ReportSource,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub backend: ReportBackend,
    pub openai_endpoint: String,
    pub openai_model: String,
    pub huggingface_endpoint: String,
    /// Bearer token for the selected backend; never persisted.
    pub api_key: Option<String>,
    /// Upper bound on one remote attempt, after which the local report is used.
    pub timeout: Duration,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            backend: ReportBackend::Simulated,
            openai_endpoint: "https://api.openai.com/v1/chat/completions".into(),
            openai_model: "gpt-3.5-turbo".into(),
            huggingface_endpoint:
                "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2"
                    .into(),
            api_key: None,
            timeout: Duration::from_secs(15),
        }
    }
}

pub struct ReportGenerator {
    options: ReportOptions,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl ReportGenerator {
    pub fn new(options: ReportOptions, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .context("failed to build HTTP client for reports")?;

        Ok(Self {
            options,
            client,
            clock,
        })
    }

    /// `records` newest first. Returns `None` below [`MIN_RECORDS_FOR_REPORT`];
    /// otherwise always returns a report.
    pub async fn generate(&self, records: &[InteractionRecord]) -> Option<Report> {
        if records.len() < MIN_RECORDS_FOR_REPORT {
            log_info!(
                "Not enough records for a report ({} < {})",
                records.len(),
                MIN_RECORDS_FOR_REPORT
            );
            return None;
        }

        let stats = ReportStats::from_records(records);

        if self.options.backend != ReportBackend::Simulated {
            match self.fetch_remote(&stats).await {
                Ok(report) => return Some(report),
                Err(err) => {
                    log_error!("Remote report failed, using local report: {err:#}");
                }
            }
        }

        Some(self.local_report(stats))
    }

    pub fn local_report(&self, stats: ReportStats) -> Report {
        let timestamp = self.clock.now();
        Report {
            timestamp,
            content: render_local_report(&stats, timestamp),
            stats,
            source: ReportSource::Local,
        }
    }

    async fn fetch_remote(&self, stats: &ReportStats) -> Result<Report> {
        let Some(api_key) = self.options.api_key.as_deref().filter(|key| !key.is_empty())
        else {
            log_warn!(
                "{:?} report backend has no API key configured",
                self.options.backend
            );
            bail!("missing API key");
        };

        let request = async {
            match self.options.backend {
                ReportBackend::OpenAi => remote::fetch_chat_completion(
                    &self.client,
                    &self.options.openai_endpoint,
                    &self.options.openai_model,
                    api_key,
                    stats,
                )
                .await
                .map(|content| (content, ReportSource::OpenAi)),
                ReportBackend::HuggingFace => remote::fetch_inference(
                    &self.client,
                    &self.options.huggingface_endpoint,
                    api_key,
                    stats,
                )
                .await
                .map(|content| (content, ReportSource::HuggingFace)),
                ReportBackend::Simulated => Err(anyhow!("simulated backend has no remote")),
            }
        };

        let (content, source) = tokio::time::timeout(self.options.timeout, request)
            .await
            .map_err(|_| anyhow!("remote report timed out after {:?}", self.options.timeout))??;

        Ok(Report {
            timestamp: self.clock.now(),
            content,
            stats: stats.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tracking::InteractionCounters;
    use crate::utils::SystemClock;

    fn records(n: usize) -> Vec<InteractionRecord> {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        (0..n as u64)
            .map(|i| InteractionRecord::from_counters(ts, InteractionCounters::new(i, 2, 1)))
            .collect()
    }

    fn generator(options: ReportOptions) -> ReportGenerator {
        ReportGenerator::new(options, Arc::new(SystemClock)).unwrap()
    }

    #[tokio::test]
    async fn four_records_is_no_report() {
        let generator = generator(ReportOptions::default());
        assert_eq!(generator.generate(&records(4)).await, None);
        assert_eq!(generator.generate(&[]).await, None);
    }

    #[tokio::test]
    async fn totals_interactions_across_records() {
        let generator = generator(ReportOptions::default());
        let input = records(5);
        let expected: u64 = input
            .iter()
            .map(|r| r.click_count + r.key_count + r.focus_count)
            .sum();

        let report = generator.generate(&input).await.unwrap();
        assert_eq!(report.stats.total_interactions, expected);
        assert_eq!(report.stats.total_interactions, 25);
        assert_eq!(report.stats.total_cycles, 5);
        assert_eq!(report.source, ReportSource::Local);
        assert!(report.content.contains("Total interactions: 25"));
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back_to_local() {
        let generator = generator(ReportOptions {
            backend: ReportBackend::OpenAi,
            openai_endpoint: "http://127.0.0.1:9/v1/chat/completions".into(),
            api_key: Some("test-key".into()),
            timeout: Duration::from_secs(2),
            ..ReportOptions::default()
        });

        let report = generator.generate(&records(6)).await.unwrap();
        assert_eq!(report.source, ReportSource::Local);
        assert_eq!(report.stats.total_cycles, 6);
    }

    #[tokio::test]
    async fn silent_backend_times_out_to_local() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let generator = generator(ReportOptions {
            backend: ReportBackend::OpenAi,
            openai_endpoint: format!("http://{addr}/v1/chat/completions"),
            api_key: Some("test-key".into()),
            timeout: Duration::from_millis(200),
            ..ReportOptions::default()
        });

        let started = std::time::Instant::now();
        let report = generator.generate(&records(5)).await.unwrap();
        assert_eq!(report.source, ReportSource::Local);
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[tokio::test]
    async fn missing_key_falls_back_without_network() {
        let generator = generator(ReportOptions {
            backend: ReportBackend::HuggingFace,
            huggingface_endpoint: "http://127.0.0.1:9/".into(),
            api_key: None,
            ..ReportOptions::default()
        });

        let report = generator.generate(&records(5)).await.unwrap();
        assert_eq!(report.source, ReportSource::Local);
    }

    #[test]
    fn backend_names_match_settings_file() {
        assert_eq!(serde_json::to_string(&ReportBackend::OpenAi).unwrap(), "\"openai\"");
        assert_eq!(
            serde_json::from_str::<ReportBackend>("\"huggingface\"").unwrap(),
            ReportBackend::HuggingFace
        );
    }
}
