//! Simulation configuration structures.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::Pacing;

/// Inclusive range of milliseconds a random wait is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    /// Shortest wait in milliseconds.
    pub min_ms: u64,
    /// Longest wait in milliseconds.
    pub max_ms: u64,
}

impl DurationRange {
    /// Range `[min_ms, max_ms]`.
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Degenerate range that always yields `ms`.
    #[must_use]
    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Draw a duration uniformly from the range.
    ///
    /// An inverted range yields `min_ms`; validation rejects such ranges
    /// before they reach an actor.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let ms = if self.min_ms >= self.max_ms {
            self.min_ms
        } else {
            rng.random_range(self.min_ms..=self.max_ms)
        };
        Duration::from_millis(ms)
    }

    /// Validate that the bounds are ordered.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_ms > self.max_ms {
            return Err(format!(
                "min_ms ({}) must not exceed max_ms ({})",
                self.min_ms, self.max_ms
            ));
        }
        Ok(())
    }
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of interchangeable units (book copies).
    pub capacity: u32,
    /// Number of concurrent actors (students).
    pub actors: usize,
    /// How long the pool stays open, in milliseconds.
    pub open_duration_ms: u64,
    /// Jitter before each actor's acquire attempt.
    pub arrival: DurationRange,
    /// How long each actor holds its unit.
    pub hold: DurationRange,
    /// Runtime worker threads; `None` means one per CPU.
    pub worker_threads: Option<usize>,
    /// Seed for reproducible pacing; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            actors: 10,
            open_duration_ms: 8_000,
            arrival: DurationRange::new(500, 2_500),
            hold: DurationRange::new(1_000, 4_000),
            worker_threads: None,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of units.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the number of actors.
    #[must_use]
    pub const fn with_actors(mut self, actors: usize) -> Self {
        self.actors = actors;
        self
    }

    /// Set how long the pool stays open.
    #[must_use]
    pub const fn with_open_duration_ms(mut self, ms: u64) -> Self {
        self.open_duration_ms = ms;
        self
    }

    /// Set the arrival jitter range.
    #[must_use]
    pub const fn with_arrival(mut self, arrival: DurationRange) -> Self {
        self.arrival = arrival;
        self
    }

    /// Set the hold duration range.
    #[must_use]
    pub const fn with_hold(mut self, hold: DurationRange) -> Self {
        self.hold = hold;
        self
    }

    /// Set the runtime worker thread count.
    #[must_use]
    pub const fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Make pacing reproducible.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pool-open duration as a [`Duration`].
    #[must_use]
    pub const fn open_duration(&self) -> Duration {
        Duration::from_millis(self.open_duration_ms)
    }

    /// Pacing handed to every actor.
    #[must_use]
    pub const fn pacing(&self) -> Pacing {
        Pacing {
            arrival: self.arrival,
            hold: self.hold,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.actors == 0 {
            return Err("actors must be greater than 0".into());
        }
        if self.worker_threads == Some(0) {
            return Err("worker_threads must be greater than 0".into());
        }
        self.arrival
            .validate()
            .map_err(|e| format!("arrival range invalid: {e}"))?;
        self.hold
            .validate()
            .map_err(|e| format!("hold range invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields fall back to [`SimulationConfig::default`].
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
