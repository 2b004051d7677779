//! Core pool, actor and event abstractions.

pub mod actor;
pub mod error;
pub mod events;
pub mod resource_pool;

pub use actor::{Actor, ActorId, ActorReport, ActorState, Pacing};
pub use error::{AppResult, PoolError, SimulationError};
pub use events::{
    build_pool_event, EventKind, EventSink, InMemoryEventSink, PoolEvent, TracingEventSink,
};
pub use resource_pool::{Loan, PoolStats, ResourcePool};
