//! Simulation driver and runtime construction.

pub mod driver;
pub mod tokio_runtime;

pub use driver::{Simulation, SimulationSummary};
pub use tokio_runtime::build_runtime;
