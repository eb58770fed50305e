//! Policy traits for the tracking pipeline
//!
//! - [`AssignmentPolicy`] - decides which entity (if any) absorbs an observation
//! - [`MergeSampler`] - decides whether an unforced duplicate-merge round runs
//!
//! Both are swappable so alternative strategies can be plugged in without
//! touching the tracker or the pruner.

use rand::Rng;

use crate::config::SimilarityConfig;
use crate::errors::TrackingError;
use crate::types::{BlobEstimate, TrackedEntity};

/// Frame-to-entity assignment strategy
///
/// Implementations:
/// - [`GreedyFirstMatch`] - first similar entity in list order wins
pub trait AssignmentPolicy: Send + Sync {
    /// Choose the entity that should absorb `candidate`.
    ///
    /// # Arguments
    /// * `entities` - Current entity list, in scan order
    /// * `candidate` - Observation converted to tracker units
    /// * `generation_len` - Signal length every not-yet-updated entity has this frame
    /// * `similarity` - Association gate
    ///
    /// # Returns
    /// Index into `entities`, or `None` to start a new entity
    fn assign(
        &self,
        entities: &[TrackedEntity],
        candidate: &BlobEstimate,
        generation_len: usize,
        similarity: &SimilarityConfig,
    ) -> Result<Option<usize>, TrackingError>;

    /// Get policy name
    fn name(&self) -> &'static str;
}

/// Greedy first-match assignment.
///
/// Scans entities in list order and picks the first one that has not been
/// updated yet this frame and passes the similarity gate. No attempt is
/// made at a globally optimal matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyFirstMatch;

impl AssignmentPolicy for GreedyFirstMatch {
    fn assign(
        &self,
        entities: &[TrackedEntity],
        candidate: &BlobEstimate,
        generation_len: usize,
        similarity: &SimilarityConfig,
    ) -> Result<Option<usize>, TrackingError> {
        for (idx, entity) in entities.iter().enumerate() {
            if entity.signal.len() == generation_len && entity.similar_to(candidate, similarity)? {
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "GreedyFirstMatch"
    }
}

/// Gate for unforced duplicate-merge rounds
///
/// Merging compares every pair of entities, so unforced rounds are thinned
/// out by sampling. Forced rounds bypass the sampler entirely.
///
/// Implementations:
/// - [`BernoulliSampler`] - runs with a fixed probability
/// - [`AlwaysSample`] / [`NeverSample`] - deterministic gates for tests
pub trait MergeSampler: Send + Sync {
    /// Whether this round should run
    fn should_run<R: Rng + ?Sized>(&self, rng: &mut R) -> bool;

    /// Get sampler name
    fn name(&self) -> &'static str;
}

/// Runs each round independently with probability `probability`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BernoulliSampler {
    probability: f64,
}

impl BernoulliSampler {
    /// Create a sampler; the probability is clamped to [0, 1]
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl MergeSampler for BernoulliSampler {
    fn should_run<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen_bool(self.probability)
    }

    fn name(&self) -> &'static str {
        "Bernoulli"
    }
}

/// Every round runs
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSample;

impl MergeSampler for AlwaysSample {
    fn should_run<R: Rng + ?Sized>(&self, _rng: &mut R) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "Always"
    }
}

/// Only forced rounds run
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverSample;

impl MergeSampler for NeverSample {
    fn should_run<R: Rng + ?Sized>(&self, _rng: &mut R) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "Never"
    }
}
