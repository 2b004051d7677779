//! Fair, closable counting pool of interchangeable units.
//!
//! The pool hands out at most `capacity` units. Waiters are served in arrival
//! order by a FIFO `tokio::sync::Semaphore`; a granted permit is forgotten and
//! represented by a [`Loan`] that must be passed back to [`ResourcePool::release`].
//! Because `release` consumes the loan and refuses loans granted by another
//! pool, a unit can never be returned twice and the free count can never
//! exceed `capacity`.
//!
//! Closing is one-way. After [`ResourcePool::close`] every pending and future
//! acquisition fails with [`PoolError::PoolClosed`], and so does every return:
//! a unit still on loan at closing time stays on loan for the lifetime of the
//! pool.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::{build_pool_event, ActorId, EventKind, EventSink, PoolError, SimulationError};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Proof that an actor currently holds one unit.
///
/// Dropping a loan without handing it to [`ResourcePool::release`] does not
/// return the unit.
#[derive(Debug)]
#[must_use = "a unit is only returned by passing its loan to `ResourcePool::release`"]
pub struct Loan {
    actor: ActorId,
    pool_id: u64,
    acquired_at: Instant,
}

impl Loan {
    /// Actor holding the unit.
    pub const fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Time elapsed since the unit was acquired.
    #[must_use]
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

/// Snapshot of pool accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total units.
    pub capacity: u32,
    /// Units currently free.
    pub available: u32,
    /// Units currently held by actors (including units lost at closing).
    pub on_loan: u32,
    /// Whether the pool still accepts operations.
    pub open: bool,
    /// Successful acquisitions.
    pub acquired: u64,
    /// Successful returns.
    pub released: u64,
    /// Acquisitions refused because the pool was closed.
    pub refused_acquires: u64,
    /// Returns refused because the pool was closed.
    pub lost_units: u64,
    /// Waits interrupted by cancellation.
    pub cancelled_waits: u64,
    /// Highest number of units on loan at the same time.
    pub peak_on_loan: u32,
}

#[derive(Debug, Default)]
struct PoolCounters {
    on_loan: AtomicU32,
    peak_on_loan: AtomicU32,
    acquired: AtomicU64,
    released: AtomicU64,
    refused_acquires: AtomicU64,
    lost_units: AtomicU64,
    cancelled_waits: AtomicU64,
}

/// Bounded pool shared by all actors of a simulation.
///
/// All synchronization is internal; callers only ever see `&self` methods.
pub struct ResourcePool {
    id: u64,
    capacity: u32,
    /// Free units. FIFO, so no waiter is overtaken by later arrivals.
    units: Semaphore,
    open: AtomicBool,
    /// Serializes `release` against `close` so a return can never slip in
    /// between the two halves of closing.
    gate: Mutex<()>,
    counters: PoolCounters,
    next_seq: AtomicU64,
    events: OnceLock<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl ResourcePool {
    /// Create an open pool with `capacity` free units.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfig`] when `capacity` is zero.
    pub fn new(capacity: u32) -> Result<Self, SimulationError> {
        if capacity == 0 {
            return Err(SimulationError::InvalidConfig(
                "capacity must be greater than 0".into(),
            ));
        }
        Ok(Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            capacity,
            units: Semaphore::new(capacity as usize),
            open: AtomicBool::new(true),
            gate: Mutex::new(()),
            counters: PoolCounters::default(),
            next_seq: AtomicU64::new(0),
            events: OnceLock::new(),
        })
    }

    /// Attach an event sink, replacing any sink already attached.
    #[must_use]
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = OnceLock::from(sink);
        self
    }

    /// Attach an event sink to a pool that may already be shared.
    ///
    /// Returns `false` (and keeps the current sink) if one is already attached.
    pub fn attach_events(&self, sink: Arc<dyn EventSink>) -> bool {
        self.events.set(sink).is_ok()
    }

    /// Total number of units.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Units currently free.
    #[must_use]
    pub fn available(&self) -> u32 {
        u32::try_from(self.units.available_permits()).unwrap_or(self.capacity)
    }

    /// Units currently held, including units lost at closing.
    #[must_use]
    pub fn on_loan(&self) -> u32 {
        self.counters.on_loan.load(Ordering::Acquire)
    }

    /// Non-blocking snapshot of the open flag.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Wait for a unit in FIFO order.
    ///
    /// # Errors
    ///
    /// [`PoolError::PoolClosed`] if the pool is closed at call time (returned
    /// immediately, nothing changes) or gets closed while waiting.
    pub async fn acquire(&self, actor: &ActorId) -> Result<Loan, PoolError> {
        self.acquire_inner(actor, None).await
    }

    /// Like [`acquire`](Self::acquire), but gives up when `cancel` fires.
    ///
    /// # Errors
    ///
    /// [`PoolError::PoolClosed`] as for `acquire`, or [`PoolError::Cancelled`]
    /// if the token is (or becomes) cancelled before a unit is granted.
    pub async fn acquire_or_cancel(
        &self,
        actor: &ActorId,
        cancel: &CancellationToken,
    ) -> Result<Loan, PoolError> {
        self.acquire_inner(actor, Some(cancel)).await
    }

    async fn acquire_inner(
        &self,
        actor: &ActorId,
        cancel: Option<&CancellationToken>,
    ) -> Result<Loan, PoolError> {
        if !self.is_open() {
            self.refuse_acquire(actor);
            return Err(PoolError::PoolClosed);
        }

        let granted = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => None,
                    permit = self.units.acquire() => Some(permit),
                }
            }
            None => Some(self.units.acquire().await),
        };

        match granted {
            None => {
                self.counters.cancelled_waits.fetch_add(1, Ordering::Relaxed);
                self.emit(Some(actor), EventKind::WaitCancelled);
                tracing::debug!(actor = %actor, "wait for a unit cancelled");
                Err(PoolError::Cancelled)
            }
            Some(Err(_closed)) => {
                self.refuse_acquire(actor);
                Err(PoolError::PoolClosed)
            }
            Some(Ok(permit)) => {
                permit.forget();
                let on_loan = self.counters.on_loan.fetch_add(1, Ordering::AcqRel) + 1;
                self.counters.peak_on_loan.fetch_max(on_loan, Ordering::AcqRel);
                self.counters.acquired.fetch_add(1, Ordering::Relaxed);
                self.emit(Some(actor), EventKind::Acquired);
                tracing::info!(
                    actor = %actor,
                    available = self.available(),
                    "{actor} acquired a unit."
                );
                Ok(Loan {
                    actor: actor.clone(),
                    pool_id: self.id,
                    acquired_at: Instant::now(),
                })
            }
        }
    }

    /// Return a unit to the pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::PoolClosed`] if the pool is closed. The loan is consumed
    /// anyway and its unit is never freed.
    ///
    /// [`PoolError::ForeignLoan`] if another pool granted the loan. Nothing
    /// changes on this pool and the unit stays on loan in its own pool.
    pub fn release(&self, loan: Loan) -> Result<(), PoolError> {
        if loan.pool_id != self.id {
            tracing::warn!(
                actor = %loan.actor,
                pool = self.id,
                "return refused, loan from another pool"
            );
            return Err(PoolError::ForeignLoan);
        }

        let gate = self.gate.lock();
        if !self.is_open() {
            drop(gate);
            self.counters.lost_units.fetch_add(1, Ordering::Relaxed);
            self.emit(Some(&loan.actor), EventKind::ReleaseRefused);
            tracing::debug!(actor = %loan.actor, "return refused, unit stays on loan");
            return Err(PoolError::PoolClosed);
        }
        self.counters.on_loan.fetch_sub(1, Ordering::AcqRel);
        self.units.add_permits(1);
        self.counters.released.fetch_add(1, Ordering::Relaxed);
        self.emit(Some(&loan.actor), EventKind::Released);
        drop(gate);

        tracing::info!(
            actor = %loan.actor,
            available = self.available(),
            held_ms = loan.held_for().as_millis(),
            "{} released a unit.",
            loan.actor
        );
        Ok(())
    }

    /// Close the pool. Returns `true` if this call performed the transition.
    ///
    /// Every actor blocked in `acquire` is woken and fails with
    /// [`PoolError::PoolClosed`]. Calling it again changes nothing.
    pub fn close(&self) -> bool {
        let gate = self.gate.lock();
        if !self.is_open() {
            tracing::debug!("pool already closed");
            return false;
        }
        // Semaphore first: an acquire that passed the flag check still fails.
        self.units.close();
        self.open.store(false, Ordering::Release);
        self.emit(None, EventKind::Closed);
        drop(gate);

        tracing::info!(
            available = self.available(),
            on_loan = self.on_loan(),
            "pool closed; no further operations permitted."
        );
        true
    }

    /// Snapshot of pool accounting.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let c = &self.counters;
        PoolStats {
            capacity: self.capacity,
            available: self.available(),
            on_loan: c.on_loan.load(Ordering::Acquire),
            open: self.is_open(),
            acquired: c.acquired.load(Ordering::Relaxed),
            released: c.released.load(Ordering::Relaxed),
            refused_acquires: c.refused_acquires.load(Ordering::Relaxed),
            lost_units: c.lost_units.load(Ordering::Relaxed),
            cancelled_waits: c.cancelled_waits.load(Ordering::Relaxed),
            peak_on_loan: c.peak_on_loan.load(Ordering::Acquire),
        }
    }

    fn refuse_acquire(&self, actor: &ActorId) {
        self.counters.refused_acquires.fetch_add(1, Ordering::Relaxed);
        self.emit(Some(actor), EventKind::AcquireRefused);
        tracing::debug!(actor = %actor, "acquisition refused, pool closed");
    }

    fn emit(&self, actor: Option<&ActorId>, kind: EventKind) {
        if let Some(sink) = self.events.get() {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            sink.record(build_pool_event(seq, actor, kind, self.available()));
        }
    }
}
