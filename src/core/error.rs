//! Error types for pool and simulation operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors an actor can observe while talking to a [`ResourcePool`](crate::core::ResourcePool).
///
/// Every kind is recovered locally: the actor logs the condition and ends its
/// sequence. Neither is retried by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolError {
    /// The pool was closed before (or while) the operation could take effect.
    #[error("pool closed")]
    PoolClosed,
    /// The caller was interrupted while waiting for a unit.
    #[error("cancelled while waiting")]
    Cancelled,
    /// The loan was handed to a pool that did not grant it.
    #[error("loan belongs to another pool")]
    ForeignLoan,
}

/// Construction-time failures for pools and simulations.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration values were rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The async runtime could not be created.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
