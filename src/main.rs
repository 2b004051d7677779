//! Lending library CLI.
//!
//! Runs one simulation and prints one log line per borrow, return, refusal
//! and the final summary. Every flag can also be set through the environment
//! (or a `.env` file).

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use lending_library::config::{DurationRange, SimulationConfig};
use lending_library::core::{AppResult, SimulationError, TracingEventSink};
use lending_library::runtime::{build_runtime, Simulation};
use lending_library::util::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "lending-library")]
#[command(about = "Simulate students competing for a limited number of book copies", long_about = None)]
struct Args {
    /// Number of book copies
    #[arg(long, env = "LIBRARY_CAPACITY", default_value_t = 3)]
    capacity: u32,

    /// Number of students
    #[arg(long, env = "LIBRARY_ACTORS", default_value_t = 10)]
    actors: usize,

    /// How long the library stays open, in milliseconds
    #[arg(long, env = "LIBRARY_OPEN_MS", default_value_t = 8_000)]
    open_ms: u64,

    /// Shortest arrival delay, in milliseconds
    #[arg(long, env = "LIBRARY_ARRIVAL_MIN_MS", default_value_t = 500)]
    arrival_min_ms: u64,

    /// Longest arrival delay, in milliseconds
    #[arg(long, env = "LIBRARY_ARRIVAL_MAX_MS", default_value_t = 2_500)]
    arrival_max_ms: u64,

    /// Shortest reading time, in milliseconds
    #[arg(long, env = "LIBRARY_HOLD_MIN_MS", default_value_t = 1_000)]
    hold_min_ms: u64,

    /// Longest reading time, in milliseconds
    #[arg(long, env = "LIBRARY_HOLD_MAX_MS", default_value_t = 4_000)]
    hold_max_ms: u64,

    /// Runtime worker threads (default: one per CPU)
    #[arg(long, env = "LIBRARY_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Seed for reproducible arrival and reading times
    #[arg(long, env = "LIBRARY_SEED")]
    seed: Option<u64>,

    /// Whole configuration as inline JSON; overrides the flags above
    #[arg(long, env = "LIBRARY_CONFIG_JSON")]
    config_json: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<SimulationConfig, String> {
        if let Some(json) = self.config_json.as_deref() {
            return SimulationConfig::from_json_str(json);
        }
        let config = SimulationConfig {
            capacity: self.capacity,
            actors: self.actors,
            open_duration_ms: self.open_ms,
            arrival: DurationRange::new(self.arrival_min_ms, self.arrival_max_ms),
            hold: DurationRange::new(self.hold_min_ms, self.hold_max_ms),
            worker_threads: self.worker_threads,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Args::parse()
        .into_config()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    let runtime = build_runtime(config.worker_threads)?;

    let summary = runtime.block_on(async move {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, shutting down");
                on_interrupt.cancel();
            }
        });

        let simulation = Simulation::new(config)?
            .with_events(Arc::new(TracingEventSink))
            .with_cancellation(cancel);
        Ok::<_, SimulationError>(simulation.run().await)
    })?;

    tracing::debug!(pool = ?summary.pool, "final pool state");
    Ok(())
}
