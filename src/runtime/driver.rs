//! Simulation driver: one pool, N actors, a fixed opening window, then close.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::builders::{build_actors, build_pool};
use crate::config::SimulationConfig;
use crate::core::{ActorReport, ActorState, EventSink, PoolStats, ResourcePool, SimulationError};

/// Outcome of a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// One report per actor that finished, in completion order.
    pub reports: Vec<ActorReport>,
    /// Actors that gave their unit back.
    pub returned: usize,
    /// Actors that never got a unit.
    pub aborted_before_acquire: usize,
    /// Actors left holding a unit they could not return.
    pub abandoned_holding: usize,
    /// Actor tasks that panicked instead of reporting.
    pub panicked: usize,
    /// Pool accounting after every actor finished.
    pub pool: PoolStats,
}

impl SimulationSummary {
    fn from_reports(reports: Vec<ActorReport>, panicked: usize, pool: PoolStats) -> Self {
        let count = |state: ActorState| reports.iter().filter(|r| r.state == state).count();
        Self {
            returned: count(ActorState::Returned),
            aborted_before_acquire: count(ActorState::AbortedBeforeAcquire),
            abandoned_holding: count(ActorState::AbandonedHolding),
            panicked,
            pool,
            reports,
        }
    }

    /// Number of actors accounted for (reported or panicked).
    #[must_use]
    pub fn total(&self) -> usize {
        self.reports.len() + self.panicked
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "all {} actors finished their attempts: {} returned, {} never acquired, {} kept their unit",
            self.total(),
            self.returned,
            self.aborted_before_acquire,
            self.abandoned_holding
        )?;
        if self.panicked > 0 {
            write!(f, ", {} failed", self.panicked)?;
        }
        write!(f, " ({}/{} units free)", self.pool.available, self.pool.capacity)
    }
}

/// One configured run.
pub struct Simulation {
    config: SimulationConfig,
    pool: Arc<ResourcePool>,
    cancel: CancellationToken,
}

impl Simulation {
    /// Create a run from validated configuration. The pool is built here, open,
    /// so it can be observed through [`pool`](Self::pool) before and during the run.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidConfig`] if validation fails.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate().map_err(SimulationError::InvalidConfig)?;
        let pool = build_pool(&config, None)?;
        Ok(Self {
            config,
            pool,
            cancel: CancellationToken::new(),
        })
    }

    /// Attach an event sink to the pool. Only the first sink is kept.
    #[must_use]
    pub fn with_events(self, sink: Arc<dyn EventSink>) -> Self {
        if !self.pool.attach_events(sink) {
            tracing::warn!("event sink already attached, ignoring");
        }
        self
    }

    /// Interrupt the run when `token` fires: the opening window ends early
    /// and every actor is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Configuration of this run.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The shared pool. Clone the `Arc` to watch it while [`run`](Self::run) is in progress.
    #[must_use]
    pub const fn pool(&self) -> &Arc<ResourcePool> {
        &self.pool
    }

    /// Run to completion.
    ///
    /// Spawns every actor, keeps the pool open for the configured duration,
    /// closes it once, then waits for every actor whatever its exit path.
    pub async fn run(self) -> SimulationSummary {
        let span = tracing::info_span!(
            "simulation",
            run_id = %Uuid::new_v4(),
            capacity = self.config.capacity,
            actors = self.config.actors,
        );
        self.drive().instrument(span).await
    }

    async fn drive(self) -> SimulationSummary {
        let pool = Arc::clone(&self.pool);
        let actors = build_actors(&self.config, &pool, &self.cancel);

        let mut tasks = JoinSet::new();
        for actor in actors {
            tasks.spawn(actor.run());
        }
        tracing::info!(
            open_ms = self.config.open_duration_ms,
            "library open with {} units",
            pool.capacity()
        );

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                tracing::warn!("run interrupted, closing early");
            }
            () = tokio::time::sleep(self.config.open_duration()) => {}
        }
        pool.close();

        let mut reports = Vec::with_capacity(self.config.actors);
        let mut panicked = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    panicked += 1;
                    tracing::error!(error = %e, "actor task failed");
                }
            }
        }

        let summary = SimulationSummary::from_reports(reports, panicked, pool.stats());
        tracing::info!(
            returned = summary.returned,
            aborted = summary.aborted_before_acquire,
            abandoned = summary.abandoned_holding,
            "{summary}"
        );
        summary
    }
}
