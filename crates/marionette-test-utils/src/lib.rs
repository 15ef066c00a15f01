//! Shared test fixtures and utilities for marionette crates.
//!
//! Provides reusable topology builders and deterministic RNG setup so
//! solver and control tests agree on the same reference chains.

pub mod fixtures;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{random_chain, unit_chain};
pub use rng::seeded_rng;
