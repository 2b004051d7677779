//! Builders to construct the shared pool and its actors from configuration.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use crate::config::SimulationConfig;
use crate::core::{Actor, ActorId, EventSink, ResourcePool, SimulationError};

/// Build the shared pool from configuration, attaching `events` if given.
///
/// Only the capacity is checked here; callers validate the rest of `cfg`.
///
/// # Errors
///
/// [`SimulationError::InvalidConfig`] if the capacity is zero.
pub fn build_pool(
    cfg: &SimulationConfig,
    events: Option<Arc<dyn EventSink>>,
) -> Result<Arc<ResourcePool>, SimulationError> {
    let mut pool = ResourcePool::new(cfg.capacity)?;
    if let Some(sink) = events {
        pool = pool.with_events(sink);
    }
    Ok(Arc::new(pool))
}

/// Build `cfg.actors` idle actors bound to `pool`, labelled `Student #1..=N`.
///
/// With a seed, actor `n` draws from `StdRng::seed_from_u64(seed + n)` so a
/// run's pacing is reproducible.
#[must_use]
pub fn build_actors(
    cfg: &SimulationConfig,
    pool: &Arc<ResourcePool>,
    cancel: &CancellationToken,
) -> Vec<Actor> {
    let pacing = cfg.pacing();
    (1..=cfg.actors)
        .map(|n| {
            let actor = Actor::new(ActorId::student(n), Arc::clone(pool), pacing)
                .with_cancellation(cancel.child_token());
            match cfg.seed {
                Some(seed) => actor.with_rng(StdRng::seed_from_u64(seed.wrapping_add(n as u64))),
                None => actor,
            }
        })
        .collect()
}
