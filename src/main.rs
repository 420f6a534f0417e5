// src/main.rs

mod config;
mod event_sink;
mod ops24x;
mod target_tracker;
mod types;

use anyhow::Result;
use clap::Parser;
use event_sink::{EventSink, LogSink};
use ops24x::{Ops24xSensor, VelocitySource};
use std::time::Instant;
use target_tracker::TargetTracker;
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::Config;

#[derive(Parser, Debug)]
#[command(name = "ops-radar")]
#[command(about = "OPS24x Doppler radar target tracker")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// Serial port the radar is attached to (overrides the config file)
    #[arg(long)]
    port: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("📡 OPS24x radar target tracker starting");
    info!(
        "Tracking band: {:.1}..{:.1}, lock {:.2}s, grace {:.2}s, idle notice {:.1}s",
        config.tracking.min_speed,
        config.tracking.max_speed,
        config.tracking.min_track_to_acquired_secs,
        config.tracking.targetless_grace_secs,
        config.tracking.idle_notice_interval_secs,
    );

    let port = args.port.as_deref().unwrap_or(&config.radar.port);
    let mut sensor = Ops24xSensor::open(port, config.radar.baud_rate)?;
    sensor.configure(config.radar.units)?;
    info!("✓ Radar module configured on {port}");

    let mut tracker = TargetTracker::new(&config.tracking, Instant::now());
    let mut sink = LogSink::new();
    run(&mut sensor, &mut tracker, &mut sink)
}

/// The pull loop: one sample per iteration, at most one event out. Ends
/// only when the source reports a transport failure.
fn run(
    source: &mut impl VelocitySource,
    tracker: &mut TargetTracker,
    sink: &mut impl EventSink,
) -> Result<()> {
    loop {
        let sample = source.next_sample()?;
        if let Some(event) = tracker.step(sample, Instant::now()) {
            sink.handle_event(&event);
        }
    }
}
