//! GripDash - grip-strength dynamometer dashboard
//!
//! Headless entry point: connects to the device, prints live readings and
//! records one session into the active profile.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gripdash::recording::{Hand, TrainingMode};
use gripdash::sensors::TransportMode;
use gripdash::storage::config::{load_config, load_config_from};
use gripdash::{Dashboard, ProfileStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PUMP_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Streaming,
    Polling,
    Ble,
    Demo,
}

impl From<ModeArg> for TransportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Streaming => TransportMode::Streaming,
            ModeArg::Polling => TransportMode::Polling,
            ModeArg::Ble => TransportMode::Ble,
            ModeArg::Demo => TransportMode::Demo,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TrainingArg {
    Max,
    Endurance,
    Pyramid,
    Free,
}

impl From<TrainingArg> for TrainingMode {
    fn from(mode: TrainingArg) -> Self {
        match mode {
            TrainingArg::Max => TrainingMode::Max,
            TrainingArg::Endurance => TrainingMode::Endurance,
            TrainingArg::Pyramid => TrainingMode::Pyramid,
            TrainingArg::Free => TrainingMode::Free,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum HandArg {
    Right,
    Left,
}

impl From<HandArg> for Hand {
    fn from(hand: HandArg) -> Self {
        match hand {
            HandArg::Right => Hand::Right,
            HandArg::Left => Hand::Left,
        }
    }
}

#[derive(Parser)]
#[command(name = "gripdash", about = "gripdash: grip dynamometer dashboard and recorder")]
struct Cli {
    /// Transport to use (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,
    /// Training protocol of the recorded session
    #[arg(short, long, value_enum, default_value = "free")]
    training: TrainingArg,
    /// Hand being trained
    #[arg(long, value_enum, default_value = "right")]
    hand: HandArg,
    /// Profile to record into
    #[arg(short, long)]
    profile: Option<String>,
    /// Stop after this many seconds (0 = until Ctrl-C)
    #[arg(short, long, default_value = "0")]
    duration: u64,
    /// Alternate config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the active profile's sessions as CSV and exit
    #[arg(long)]
    export: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting GripDash v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if config.data_dir.as_os_str().is_empty() {
        config.data_dir = gripdash::storage::config::get_data_dir();
    }

    let store = ProfileStore::new(&config.data_dir);
    let mut dashboard = Dashboard::new(&config, store).context("failed to load profiles")?;

    if let Some(name) = &cli.profile {
        if !dashboard.select_profile(name)? {
            anyhow::bail!("unknown profile '{}'", name);
        }
    }

    if cli.export {
        print!("{}", dashboard.export_csv()?);
        return Ok(());
    }

    dashboard.set_training_mode(cli.training.into());
    dashboard.set_hand(cli.hand.into());
    dashboard.connection_mut().set_fallback_handler(|suggested, reason| {
        tracing::warn!("Connection lost ({}); try --mode {:?}", reason, suggested);
    });

    let mode = cli
        .mode
        .map(TransportMode::from)
        .unwrap_or(config.transport.mode);
    dashboard.set_mode(mode).await?;
    if mode != TransportMode::Demo {
        dashboard.connect().await?;
    }

    dashboard.start_session().await?;
    run(&mut dashboard, cli.duration).await;

    match dashboard.stop_session().await? {
        Some(summary) => tracing::info!(
            "Saved session: max {:.2} {units}, avg {:.2} {units}, hold {} ms, {} ms total",
            summary.max_force,
            summary.avg_force,
            summary.longest_hold_ms,
            summary.duration_ms,
            units = summary.units,
        ),
        None => tracing::info!("No samples received, nothing saved"),
    }
    dashboard.disconnect();
    Ok(())
}

async fn run(dashboard: &mut Dashboard, duration_secs: u64) {
    let deadline = async {
        if duration_secs == 0 {
            std::future::pending::<()>().await;
        } else {
            tokio::time::sleep(Duration::from_secs(duration_secs)).await;
        }
    };
    tokio::pin!(deadline);

    let mut ticker = tokio::time::interval(PUMP_INTERVAL);
    let mut last_status = dashboard.connection().status();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = &mut deadline => break,
            _ = ticker.tick() => {
                for sample in dashboard.pump() {
                    println!("{:>8.2} {}", sample.force, sample.units);
                }
                let status = dashboard.connection().status();
                if status != last_status {
                    tracing::info!("Status: {}", status);
                    last_status = status;
                }
            }
        }
    }
}
