//! Tokio runtime construction for simulation runs.

use tokio::runtime::{Builder, Runtime};

use crate::core::SimulationError;

/// Build a multi-threaded runtime so actors contend in parallel.
///
/// `worker_threads` defaults to the number of logical CPUs.
///
/// # Errors
///
/// [`SimulationError::Runtime`] if the runtime cannot be created.
pub fn build_runtime(worker_threads: Option<usize>) -> Result<Runtime, SimulationError> {
    let worker_threads = worker_threads.unwrap_or_else(num_cpus::get).max(1);
    let runtime = Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name("library-worker")
        .enable_all()
        .build()?;
    tracing::debug!(worker_threads, "runtime ready");
    Ok(runtime)
}
