//! Configuration models for simulation runs.

pub mod simulation;

pub use simulation::{DurationRange, SimulationConfig};
