//! Actors: independent borrowers driving one fixed lifecycle against a pool.
//!
//! ```text
//! Idle ──jitter──▶ WaitingToAcquire ──acquire──▶ Holding ──hold──▶ Returned
//!   │                     │                         │
//!   └──────cancel─────────┴──closed/cancel──▶ AbortedBeforeAcquire
//!                                                   └──closed/cancel──▶ AbandonedHolding
//! ```
//!
//! Each step is attempted once. A refused or interrupted step ends the actor.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::DurationRange;
use crate::core::{PoolError, ResourcePool};

/// Unique, human-readable actor label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Wrap an arbitrary label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Label for the `n`-th student of a run (1-based).
    #[must_use]
    pub fn student(n: usize) -> Self {
        Self(format!("Student #{n}"))
    }

    /// Borrow the label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorState {
    /// Created, waiting out its arrival jitter.
    Idle,
    /// Calling `acquire`.
    WaitingToAcquire,
    /// Holds one unit.
    Holding,
    /// Gave its unit back. Terminal.
    Returned,
    /// Never got a unit (pool closed or interrupted). Terminal.
    AbortedBeforeAcquire,
    /// Got a unit but could not give it back. Terminal.
    AbandonedHolding,
}

impl ActorState {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Returned | Self::AbortedBeforeAcquire | Self::AbandonedHolding
        )
    }

    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::WaitingToAcquire | Self::AbortedBeforeAcquire)
                | (
                    Self::WaitingToAcquire,
                    Self::Holding | Self::AbortedBeforeAcquire
                )
                | (Self::Holding, Self::Returned | Self::AbandonedHolding)
        )
    }
}

/// Random durations an actor waits before acquiring and while holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    /// Arrival jitter before the acquire attempt.
    pub arrival: DurationRange,
    /// Time a unit is held before the return attempt.
    pub hold: DurationRange,
}

/// How an actor's run ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorReport {
    /// Actor label.
    pub id: ActorId,
    /// Terminal state.
    pub state: ActorState,
    /// Condition that ended the run early, if any.
    pub cause: Option<PoolError>,
    /// Every state entered, in order, starting with `Idle`.
    pub trail: Vec<ActorState>,
    /// How long a unit was held, if one was acquired.
    pub held_for: Option<Duration>,
}

/// One borrower.
pub struct Actor {
    id: ActorId,
    pool: Arc<ResourcePool>,
    pacing: Pacing,
    cancel: CancellationToken,
    rng: StdRng,
    trail: Vec<ActorState>,
}

impl Actor {
    /// Create an idle actor bound to `pool`.
    #[must_use]
    pub fn new(id: ActorId, pool: Arc<ResourcePool>, pacing: Pacing) -> Self {
        Self {
            id,
            pool,
            pacing,
            cancel: CancellationToken::new(),
            rng: StdRng::from_os_rng(),
            trail: vec![ActorState::Idle],
        }
    }

    /// Interrupt sleeps and waits when `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Use a specific random source (e.g. a seeded one).
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Actor label.
    #[must_use]
    pub const fn id(&self) -> &ActorId {
        &self.id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ActorState {
        self.trail.last().copied().unwrap_or(ActorState::Idle)
    }

    /// Run the full lifecycle once.
    pub async fn run(self) -> ActorReport {
        let span = tracing::info_span!("actor", actor = %self.id);
        self.lifecycle().instrument(span).await
    }

    async fn lifecycle(mut self) -> ActorReport {
        let arrival = self.pacing.arrival.sample(&mut self.rng);
        tracing::debug!(arrival_ms = arrival.as_millis(), "arriving");
        if let Err(cause) = self.pause(arrival).await {
            tracing::warn!("{} was interrupted before acquiring.", self.id);
            return self.finish(ActorState::AbortedBeforeAcquire, Some(cause), None);
        }

        self.enter(ActorState::WaitingToAcquire);
        let loan = match self.pool.acquire_or_cancel(&self.id, &self.cancel).await {
            Ok(loan) => loan,
            Err(cause @ PoolError::Cancelled) => {
                tracing::warn!("{} was interrupted before acquiring.", self.id);
                return self.finish(ActorState::AbortedBeforeAcquire, Some(cause), None);
            }
            Err(cause) => {
                tracing::info!("{} could not acquire: {cause}.", self.id);
                return self.finish(ActorState::AbortedBeforeAcquire, Some(cause), None);
            }
        };

        self.enter(ActorState::Holding);
        let hold = self.pacing.hold.sample(&mut self.rng);
        tracing::debug!(hold_ms = hold.as_millis(), "holding");
        if let Err(cause) = self.pause(hold).await {
            tracing::warn!("{} was interrupted while holding a unit.", self.id);
            let held = loan.held_for();
            drop(loan);
            return self.finish(ActorState::AbandonedHolding, Some(cause), Some(held));
        }

        let held = loan.held_for();
        match self.pool.release(loan) {
            Ok(()) => self.finish(ActorState::Returned, None, Some(held)),
            Err(cause) => {
                tracing::info!("{} could not release: {cause}.", self.id);
                self.finish(ActorState::AbandonedHolding, Some(cause), Some(held))
            }
        }
    }

    async fn pause(&self, duration: Duration) -> Result<(), PoolError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(PoolError::Cancelled),
            () = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn enter(&mut self, next: ActorState) {
        debug_assert!(
            self.state().can_transition_to(next),
            "illegal transition {:?} -> {next:?}",
            self.state()
        );
        self.trail.push(next);
    }

    fn finish(
        mut self,
        terminal: ActorState,
        cause: Option<PoolError>,
        held_for: Option<Duration>,
    ) -> ActorReport {
        self.enter(terminal);
        tracing::debug!(state = ?terminal, "finished");
        ActorReport {
            id: self.id,
            state: terminal,
            cause,
            trail: self.trail,
            held_for,
        }
    }
}
