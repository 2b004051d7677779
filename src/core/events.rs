//! Pool event stream.
//!
//! Every state change the pool performs (and every operation it refuses) is
//! published as a [`PoolEvent`] to an optional [`EventSink`]. The in-memory
//! sink keeps a bounded ring buffer and is what the scenario tests inspect.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::ActorId;
use crate::util::clock::now_ms;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A unit was handed to an actor.
    Acquired,
    /// A unit was returned to the pool.
    Released,
    /// An acquisition was refused because the pool is closed.
    AcquireRefused,
    /// A return was refused because the pool is closed; the unit is lost.
    ReleaseRefused,
    /// A waiting actor was interrupted before it got a unit.
    WaitCancelled,
    /// The pool transitioned from open to closed.
    Closed,
}

/// A single observable pool event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEvent {
    /// Monotonic sequence number assigned by the pool.
    pub seq: u64,
    /// Actor involved, if any (`None` for [`EventKind::Closed`]).
    pub actor: Option<ActorId>,
    /// Event kind.
    pub kind: EventKind,
    /// Free units right after the event took effect.
    pub available: u32,
    /// Wall-clock timestamp in milliseconds since epoch.
    pub at_ms: u128,
}

impl fmt::Display for PoolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actor = self.actor.as_ref().map_or("pool", ActorId::as_str);
        match self.kind {
            EventKind::Acquired => write!(f, "{actor} acquired a unit."),
            EventKind::Released => write!(f, "{actor} released a unit."),
            EventKind::AcquireRefused => write!(f, "{actor} could not acquire: pool closed."),
            EventKind::ReleaseRefused => write!(f, "{actor} could not release: pool closed."),
            EventKind::WaitCancelled => write!(f, "{actor} was interrupted while waiting."),
            EventKind::Closed => write!(f, "pool closed; no further operations permitted."),
        }
    }
}

/// Event sink abstraction.
pub trait EventSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: PoolEvent);
}

/// In-memory event sink with a bounded buffer.
///
/// Clones share the same buffer, so a test can keep a handle while the pool
/// owns another.
#[derive(Clone)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<VecDeque<PoolEvent>>>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a new in-memory sink holding at most `max_events`.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<PoolEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Count stored events of one kind.
    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind == kind).count()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&self, event: PoolEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that re-emits events as `debug` tracing records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: PoolEvent) {
        tracing::debug!(
            seq = event.seq,
            kind = ?event.kind,
            available = event.available,
            "{event}"
        );
    }
}

/// Helper to build an event stamped with the current time.
#[must_use]
pub fn build_pool_event(
    seq: u64,
    actor: Option<&ActorId>,
    kind: EventKind,
    available: u32,
) -> PoolEvent {
    PoolEvent {
        seq,
        actor: actor.cloned(),
        kind,
        available,
        at_ms: now_ms(),
    }
}
