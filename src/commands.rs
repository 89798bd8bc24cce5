//! CLI commands: a standalone host for the coordinator and its sensors
//!
//! - watch: refresh on a schedule, one JSON line per update
//! - once:  refresh once and print the sensor states
//! - parse: run the extractor on a saved account page

use crate::config::{Credentials, Endpoints, FetchConfig, PollInterval, DEFAULT_BASE_URL};
use crate::coordinator::Coordinator;
use crate::extract;
use crate::fetch::SessionFetcher;
use crate::schema::{FailureKind, RefreshState};
use crate::sensor::{SensorKind, SensorState};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Args)]
pub struct SessionArgs {
    /// Iliad account identifier
    #[arg(long, env = "ILIAD_USERNAME")]
    pub username: String,

    /// Iliad account password
    #[arg(long, env = "ILIAD_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Timeout per request in milliseconds
    #[arg(long, default_value = "30000")]
    pub timeout: u64,

    /// Site root the login and account paths are resolved against
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[derive(Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Fixed refresh period in seconds (default: 6h plus a random 0-15 min)
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

#[derive(Args)]
pub struct OnceArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output format: json (default) or yaml
    #[arg(long, short, default_value = "json")]
    pub format: String,
}

#[derive(Args)]
pub struct ParseArgs {
    /// Saved account page (HTML)
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Output format: json (default) or yaml
    #[arg(long, short, default_value = "json")]
    pub format: String,
}

/// Sensor states plus refresh metadata
#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<FailureKind>,
    pub sensors: Vec<SensorState>,
}

impl Report {
    /// Build from an owned copy of the published state, never from a live watch borrow
    fn from_state(state: &RefreshState) -> Self {
        Self {
            refreshed_at: state.refreshed_at,
            last_failure: state.last_failure,
            sensors: SensorKind::ALL
                .into_iter()
                .map(|kind| kind.project(&state.reading))
                .collect(),
        }
    }
}

fn build_fetcher(args: &SessionArgs) -> Result<SessionFetcher> {
    let endpoints = Endpoints::from_base(&args.base_url)
        .with_context(|| format!("Invalid base URL: {}", args.base_url))?;
    let config = FetchConfig {
        timeout_ms: args.timeout,
        ..FetchConfig::default()
    };
    Ok(SessionFetcher::new(
        Credentials::new(&args.username, &args.password),
        endpoints,
        config,
    ))
}

fn render<T: Serialize>(value: &T, format: &str) -> Result<String> {
    Ok(match format {
        "yaml" | "yml" => serde_yaml::to_string(value)?,
        _ => serde_json::to_string_pretty(value)?,
    })
}

/// Run the watch command
pub async fn run_watch(args: WatchArgs) -> Result<()> {
    let fetcher = build_fetcher(&args.session)?;
    let interval = match args.interval_secs {
        Some(secs) => PollInterval::fixed(Duration::from_secs(secs.max(1))),
        None => PollInterval::randomized(&mut rand::thread_rng()),
    };
    info!(period_secs = interval.period().as_secs(), "starting refresh loop");

    let coordinator = Arc::new(Coordinator::new(fetcher, interval));
    let mut updates = coordinator.subscribe();
    let polling = coordinator.clone().spawn_polling();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                let report = Report::from_state(&state);
                println!("{}", serde_json::to_string(&report)?);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                break;
            }
        }
    }

    polling.abort();
    Ok(())
}

/// Run the once command
pub async fn run_once(args: OnceArgs) -> Result<()> {
    let fetcher = build_fetcher(&args.session)?;
    let coordinator = Coordinator::new(fetcher, PollInterval::fixed(Duration::ZERO));
    coordinator.refresh().await;

    let state = coordinator.state();
    println!("{}", render(&Report::from_state(&state), &args.format)?);

    if let Some(kind) = state.last_failure {
        bail!("Refresh failed: {}", kind);
    }
    Ok(())
}

/// Run the parse command
pub async fn run_parse(args: ParseArgs) -> Result<()> {
    let html = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read file: {}", args.file))?;

    let reading = extract::parse(&html);
    println!("{}", render(&reading, &args.format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Reading;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use tokio::sync::watch;

    #[test]
    fn test_render_formats() {
        let reading = Reading {
            data_usage_unit: Some("GB".to_string()),
            ..Reading::default()
        };
        let json = render(&reading, "json").unwrap();
        assert!(json.contains("\"data_usage_unit\": \"GB\""));

        let yaml = render(&reading, "yaml").unwrap();
        assert!(yaml.contains("data_usage_unit: GB"));
    }

    #[test]
    fn test_report_from_state() {
        let state = RefreshState {
            last_failure: Some(FailureKind::Transport),
            ..RefreshState::default()
        };
        let report = Report::from_state(&state);

        assert_eq!(report.sensors.len(), 3);
        assert_eq!(report.last_failure, Some(FailureKind::Transport));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["last_failure"], "transport");
        assert!(json.get("refreshed_at").is_none());
    }

    #[test]
    fn test_report_sensors_share_one_reading() {
        let state = RefreshState {
            reading: Arc::new(Reading {
                data_usage: Some("3".to_string()),
                data_usage_unit: Some("GB".to_string()),
                ..Reading::default()
            }),
            ..RefreshState::default()
        };
        let report = Report::from_state(&state);

        assert_eq!(report.sensors[0].unit, Some("EUR".to_string()));
        assert_eq!(report.sensors[1].state, Some("3".to_string()));
        assert_eq!(report.sensors[1].unit, Some("GB".to_string()));
    }

    #[test]
    fn test_report_while_publishing_does_not_block() {
        let (tx, mut rx) = watch::channel(RefreshState::default());
        let stop = Arc::new(AtomicBool::new(false));

        let writer = std::thread::spawn({
            let stop = stop.clone();
            move || {
                while !stop.load(Ordering::Relaxed) {
                    tx.send_replace(RefreshState::default());
                }
            }
        });

        let (done_tx, done_rx) = mpsc::channel();
        std::thread::spawn(move || {
            for _ in 0..20_000 {
                let state = rx.borrow_and_update().clone();
                let report = Report::from_state(&state);
                assert_eq!(report.sensors.len(), 3);
            }
            let _ = done_tx.send(());
        });

        let finished = done_rx.recv_timeout(Duration::from_secs(20));
        stop.store(true, Ordering::Relaxed);
        writer.join().unwrap();
        assert!(finished.is_ok(), "report loop stalled behind the publisher");
    }

    #[test]
    fn test_build_fetcher_rejects_bad_base_url() {
        let args = SessionArgs {
            username: "u".to_string(),
            password: "p".to_string(),
            timeout: 1000,
            base_url: "::nope::".to_string(),
        };
        let err = build_fetcher(&args).err().unwrap();
        assert!(err.to_string().contains("Invalid base URL"));
    }
}
