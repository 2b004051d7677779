//! Builders to construct pools and actors from configuration.

pub mod pool_builder;

pub use pool_builder::{build_actors, build_pool};
