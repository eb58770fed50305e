//! Shared numerics and deterministic randomness.
//!
//! Statistics used by the pruning stages (mean, correlation, two-cluster
//! split) and the seedable generator used by tests, benches and the CLI.

pub mod rng;
pub mod stats;
