//! Cadence - drive tick timers through a simulated frame loop
//!
//! Loads a scenario, ticks each timer once per frame and logs every
//! lifecycle notification.

mod driver;
mod scenario;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::driver::Driver;
use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(about = "Drive tick timers through a simulated frame loop")]
#[command(version)]
struct Args {
    /// Scenario file (defaults to ~/.config/cadence/scenario.toml)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Override the scenario's time scale
    #[arg(long)]
    time_scale: Option<f32>,

    /// Print final timer snapshots as JSON
    #[arg(long)]
    json: bool,

    /// Log progress updates
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    anyhow::ensure!(
        args.fps.is_finite() && args.fps > 0.0,
        "fps must be positive, got {}",
        args.fps
    );

    let scenario = Scenario::load(args.scenario.as_deref())?;
    info!(
        timers = scenario.timers.len(),
        frames = args.frames,
        fps = args.fps,
        "Starting Cadence..."
    );

    let mut driver = Driver::new(&scenario);
    if let Some(scale) = args.time_scale {
        anyhow::ensure!(
            scale.is_finite() && scale >= 0.0,
            "time scale must be non-negative, got {}",
            scale
        );
        driver.set_time_scale(scale);
    }
    driver.run(args.frames, 1.0 / args.fps);

    let report = driver.report();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} frames, {:.3}s simulated",
            driver.clock().frame(),
            driver.clock().elapsed()
        );
        for entry in &report {
            println!(
                "{:<16} {:<8} {:>8.3}/{:<8.3} progress {:>5.1}%  cycles {}",
                entry.name,
                entry.snapshot.state,
                entry.snapshot.current_time,
                entry.snapshot.duration,
                entry.snapshot.progress * 100.0,
                entry.cycles
            );
        }
    }

    Ok(())
}
