//! iliad-sensor CLI
//!
//! Standalone host for the Iliad account sensors.
//! Logs go to stderr; sensor states go to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iliad_sensor::commands::{run_once, run_parse, run_watch, OnceArgs, ParseArgs, WatchArgs};

#[derive(Parser)]
#[command(name = "iliad-sensor")]
#[command(version)]
#[command(about = "Iliad account balance and data usage sensors")]
#[command(long_about = "Logs in to the Iliad customer area and reports balance, data usage and remaining data.\n\nCommands:\n  watch   Refresh on a schedule, one JSON line per update\n  once    Refresh once and print the sensor states\n  parse   Extract readings from a saved account page")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh periodically and print sensor states on every update
    Watch(WatchArgs),
    /// Refresh once and print sensor states
    Once(OnceArgs),
    /// Extract readings from a saved account page (offline)
    Parse(ParseArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    match cli.command {
        Commands::Watch(args) => run_watch(args).await,
        Commands::Once(args) => run_once(args).await,
        Commands::Parse(args) => run_parse(args).await,
    }
}

fn setup_logging(debug: bool) {
    let default = if debug {
        "iliad_sensor=debug"
    } else {
        "iliad_sensor=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
