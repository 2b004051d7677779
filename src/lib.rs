//! # Lending Library
//!
//! A bounded-resource concurrency simulation: a library owns a fixed number of
//! interchangeable book copies, and many students borrow them concurrently.
//!
//! Each student waits a random arrival jitter, borrows one copy (waiting in
//! FIFO order when none is free), reads for a random time, then returns it.
//! After a fixed opening window the library closes: nobody may borrow or
//! return from then on. Students still waiting are turned away, and students
//! still reading keep their copy.
//!
//! ## Components
//!
//! - [`core::ResourcePool`]: fair counting pool with a one-way open/closed flag
//! - [`core::Actor`]: one student running `Idle → WaitingToAcquire → Holding → Returned`
//! - [`runtime::Simulation`]: spawns the actors, closes the pool, joins everyone
//!
//! ```rust,ignore
//! use lending_library::config::{DurationRange, SimulationConfig};
//! use lending_library::runtime::Simulation;
//!
//! let config = SimulationConfig::new()
//!     .with_capacity(3)
//!     .with_actors(10)
//!     .with_open_duration_ms(8_000)
//!     .with_arrival(DurationRange::new(500, 2_500));
//!
//! let summary = Simulation::new(config)?.run().await?;
//! println!("{summary}");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Pool, actor, event and error types.
pub mod core;
/// Configuration models for simulation runs.
pub mod config;
/// Builders to construct pools and actors from configuration.
pub mod builders;
/// Simulation driver and runtime construction.
pub mod runtime;
/// Shared utilities.
pub mod util;
