//! Tests for configuration validation

use lending_library::config::{DurationRange, SimulationConfig};

#[test]
fn test_simulation_config_validation() {
    let valid = SimulationConfig::new()
        .with_capacity(2)
        .with_actors(5)
        .with_open_duration_ms(0);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_simulation_config_invalid_capacity() {
    let invalid = SimulationConfig::new().with_capacity(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_simulation_config_invalid_actors() {
    let invalid = SimulationConfig::new().with_actors(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_simulation_config_invalid_worker_threads() {
    let invalid = SimulationConfig::new().with_worker_threads(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_simulation_config_inverted_range() {
    let invalid = SimulationConfig::new().with_hold(DurationRange::new(4_000, 1_000));
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("hold range invalid"));
}

#[test]
fn test_simulation_config_from_json() {
    let json = r#"{
        "capacity": 2,
        "actors": 5,
        "open_duration_ms": 1500,
        "arrival": { "min_ms": 10, "max_ms": 20 },
        "hold": { "min_ms": 100, "max_ms": 200 },
        "seed": 9
    }"#;

    let config = SimulationConfig::from_json_str(json).unwrap();
    assert_eq!(config.capacity, 2);
    assert_eq!(config.actors, 5);
    assert_eq!(config.arrival, DurationRange::new(10, 20));
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.worker_threads, None);
}

#[test]
fn test_simulation_config_json_defaults_missing_fields() {
    let config = SimulationConfig::from_json_str(r#"{ "capacity": 1 }"#).unwrap();
    assert_eq!(config.capacity, 1);
    assert_eq!(config.actors, SimulationConfig::default().actors);
}

#[test]
fn test_simulation_config_json_rejected_when_invalid() {
    assert!(SimulationConfig::from_json_str(r#"{ "actors": 0 }"#).is_err());
    assert!(SimulationConfig::from_json_str("not json").is_err());
}
