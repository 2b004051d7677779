//! Tests for error types

use lending_library::core::{PoolError, SimulationError};

#[test]
fn test_pool_closed_error() {
    let err = PoolError::PoolClosed;
    assert_eq!(format!("{}", err), "pool closed");
}

#[test]
fn test_cancelled_error() {
    let err = PoolError::Cancelled;
    assert_eq!(format!("{}", err), "cancelled while waiting");
    assert_ne!(err, PoolError::PoolClosed);
}

#[test]
fn test_foreign_loan_error() {
    let err = PoolError::ForeignLoan;
    assert_eq!(format!("{}", err), "loan belongs to another pool");
}

#[test]
fn test_invalid_config_error() {
    let err = SimulationError::InvalidConfig("capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: capacity must be greater than 0"
    );
}

#[test]
fn test_runtime_error_from_io() {
    let io = std::io::Error::other("no threads");
    let err: SimulationError = io.into();
    assert_eq!(format!("{}", err), "runtime error: no threads");
}
