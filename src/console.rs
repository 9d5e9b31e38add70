//! Line-oriented front end: each input line is a UI action, each event is
//! printed as it arrives.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};

use crate::{commands, events::AppEvent, AppState};

const HELP: &str = "\
commands:
  c | click     count a click
  k | key       count a keystroke
  f | focus     count a focus change
  start         begin sampling
  reset         stop sampling and erase counters, mode history and records
  clear         erase stored records (while stopped)
  report        generate a balance report now
  history       show the most recent records
  status        show sampler status
  help          show this text
  quit          stop sampling and exit; records are kept";

pub async fn run(state: Arc<AppState>) -> Result<()> {
    let printer = spawn_event_printer(state.events.subscribe());

    println!("{HELP}");
    commands::get_history(&state)
        .await
        .map_err(anyhow::Error::msg)
        .context("failed to load history at start-up")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match line.trim() {
            "" => {}
            "c" | "click" => {
                commands::record_click(&state);
            }
            "k" | "key" => {
                commands::record_key_press(&state);
            }
            "f" | "focus" => {
                commands::record_focus_change(&state);
            }
            "start" => {
                let was_running = state.sampler.is_running().await;
                match commands::start_analysis(&state).await {
                    Ok(_) if was_running => println!("Analysis already running."),
                    Ok(_) => println!(
                        "Analysis started ({}s windows).",
                        state.sampler.config().sampling_interval.as_secs()
                    ),
                    Err(err) => println!("error: {err}"),
                }
            }
            "reset" => match commands::reset_analysis(&state).await {
                Ok(true) => println!("Analysis reset; records cleared."),
                Ok(false) => println!("Analysis is not running."),
                Err(err) => println!("error: {err}"),
            },
            "clear" => match commands::clear_history(&state).await {
                Ok(removed) => println!("{removed} records cleared."),
                Err(err) => println!("error: {err}"),
            },
            "report" => {
                if let Err(err) = commands::generate_report(&state).await {
                    println!("error: {err}");
                }
            }
            "history" => {
                if let Err(err) = commands::get_history(&state).await {
                    println!("error: {err}");
                }
            }
            "status" => {
                let status = commands::get_status(&state).await;
                let counters = commands::get_counters(&state);
                println!(
                    "{:?} | cycles {} | last {} | live C:{} K:{} F:{}",
                    status.status,
                    status.cycles_completed,
                    status
                        .last_mode
                        .map(|mode| format!("{mode} ({})", status.last_score.unwrap_or(0)))
                        .unwrap_or_else(|| "-".into()),
                    counters.clicks,
                    counters.keystrokes,
                    counters.focus_changes
                );
            }
            "help" => println!("{HELP}"),
            "q" | "quit" | "exit" => break,
            other => println!("unknown command '{other}' (try 'help')"),
        }
    }

    state.sampler.shutdown().await;
    printer.abort();
    Ok(())
}

fn spawn_event_printer(mut events: broadcast::Receiver<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(event),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("console fell behind; {skipped} events skipped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn print_event(event: AppEvent) {
    match event {
        AppEvent::CountersChanged(_) | AppEvent::StatusChanged(_) => {}
        AppEvent::ModeUpdated {
            score,
            mode,
            counters,
        } => println!(
            "mode: {mode} (score {score}; click={}, key={}, focus={})",
            counters.clicks, counters.keystrokes, counters.focus_changes
        ),
        AppEvent::ImbalanceDetected(notification) => {
            println!("[notice] {}: {}", notification.title, notification.message);
            let dismiss_after = std::time::Duration::from_millis(notification.dismiss_after_ms);
            tokio::spawn(async move {
                tokio::time::sleep(dismiss_after).await;
                println!("[notice dismissed] {}", notification.title);
            });
        }
        AppEvent::HistoryUpdated(view) => {
            println!("history:");
            for line in view.render_lines() {
                println!("  {line}");
            }
        }
        AppEvent::ReportReady(report) => {
            println!("report ({:?}):", report.source);
            println!("{}", report.content);
        }
        AppEvent::ReportUnavailable { records_available } => println!(
            "Not enough data for a report yet ({records_available} of {} cycles).",
            crate::report::MIN_RECORDS_FOR_REPORT
        ),
    }
}
