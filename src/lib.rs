/*!
# Flicker tracker - tracking and pruning for blinking light sources

Follows light blobs reported by a per-frame detector, assigns them stable
identities and records a binary on/off history for each one. The histories
are then cleaned up so that only entities carrying a periodic signal reach a
downstream decoder.

## Features

- Greedy frame-to-frame association with a recency-widened distance gate
- Noise elimination by periodicity clustering (two-means on a duty-cycle metric)
- Duplicate merging by suffix correlation
- Deterministic, injectable randomness (`rand::Rng`)

## Modules

- [`tracker`] - Association of observations to entities
- [`noise`], [`merge`], [`pruner`] - Signal hygiene
- [`pipeline`] - Frame loop and end-of-stream prune
- [`reporter`] - Observability hooks
- [`scenario`] - JSON scenarios and synthetic blinking sources
- [`common`] - Statistics and RNG

## Example

```rust
use flicker_tracker_rs::{Observation, Pipeline, PipelineConfig, SimpleRng};

let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
let mut rng = SimpleRng::new(42);

for t in 0..40 {
    let frame = if (t / 5) % 2 == 0 {
        vec![Observation::new(100.0, 50.0, 8.0)]
    } else {
        vec![]
    };
    pipeline.step(&mut rng, &frame).unwrap();
}

let (entities, _) = pipeline.finish(&mut rng).unwrap();
assert_eq!(entities.len(), 1);
assert_eq!(entities[0].signal.len(), 40);
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Binary on/off histories
pub mod signal;

/// Observations, estimates and tracked entities
pub mod types;

/// Tunable parameters
pub mod config;

/// Error types
pub mod errors;

/// Association and sampling policies
pub mod traits;

/// Frame-to-frame association
pub mod tracker;

/// Periodicity-based noise elimination
pub mod noise;

/// Duplicate-entity merging
pub mod merge;

/// Merge + noise orchestration
pub mod pruner;

/// Per-frame driver
pub mod pipeline;

/// Observability hooks
pub mod reporter;

/// Scenario files and synthetic streams
pub mod scenario;

/// Statistics and RNG
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use signal::Signal;
pub use types::{BlobEstimate, EntityId, Observation, Position, TrackedEntity};

// Configuration
pub use config::{
    MergeConfig, NoiseConfig, PipelineConfig, PruneConfig, SimilarityConfig, TrackerConfig,
};

// Errors
pub use errors::TrackingError;

// Traits and policies
pub use traits::{
    AlwaysSample, AssignmentPolicy, BernoulliSampler, GreedyFirstMatch, MergeSampler, NeverSample,
};

// Components
pub use merge::{MergeEvent, MergeReport, SignalMerger};
pub use noise::{periodicity_metric, NoiseEliminator, NoiseReport};
pub use pipeline::{Pipeline, StepOutput};
pub use pruner::{PruneReport, Pruner};
pub use tracker::{IdCounter, TrackReport, Tracker};

// Reporters
pub use reporter::{
    CompositeReporter, DebugReporter, LoggingReporter, NoOpReporter, PipelineReporter,
};

// RNG
pub use common::rng::SimpleRng;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
