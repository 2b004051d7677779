//! Tests for builder modules

use lending_library::builders::{build_actors, build_pool};
use lending_library::config::SimulationConfig;
use lending_library::core::{ActorId, ActorState};
use tokio_util::sync::CancellationToken;

#[test]
fn test_build_pool_from_config() {
    let config = SimulationConfig::new().with_capacity(4);
    let pool = build_pool(&config, None).unwrap();
    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.available(), 4);
    assert!(pool.is_open());
}

#[test]
fn test_build_pool_rejects_zero_capacity() {
    let config = SimulationConfig::new().with_capacity(0);
    assert!(build_pool(&config, None).is_err());
}

#[test]
fn test_build_actors_labels_and_states() {
    let config = SimulationConfig::new().with_actors(3).with_seed(5);
    let pool = build_pool(&config, None).unwrap();
    let actors = build_actors(&config, &pool, &CancellationToken::new());

    let ids: Vec<ActorId> = actors.iter().map(|a| a.id().clone()).collect();
    assert_eq!(
        ids,
        vec![ActorId::student(1), ActorId::student(2), ActorId::student(3)]
    );
    assert!(actors.iter().all(|a| a.state() == ActorState::Idle));
}
