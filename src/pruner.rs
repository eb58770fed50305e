//! Pruning orchestration
//!
//! Runs after every tracking step. Duplicate merging (forced rounds, and
//! optionally sampled unforced rounds) always precedes noise elimination so
//! that a duplicated source is classified on its merged signal.

use rand::Rng;

use crate::config::PruneConfig;
use crate::errors::TrackingError;
use crate::merge::{MergeReport, SignalMerger};
use crate::noise::{NoiseEliminator, NoiseReport};
use crate::traits::{BernoulliSampler, MergeSampler};
use crate::types::TrackedEntity;

/// Outcome of one prune call
#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    /// Merge round, if one was attempted
    pub merge: Option<MergeReport>,
    /// Noise round, if one was attempted
    pub noise: Option<NoiseReport>,
}

impl PruneReport {
    /// Total entities deleted by this call
    pub fn removed(&self) -> usize {
        self.merge.as_ref().map_or(0, |m| m.removed.len())
            + self.noise.as_ref().map_or(0, |n| n.removed.len())
    }
}

/// Merges duplicates and removes noise
#[derive(Debug, Clone)]
pub struct Pruner<S: MergeSampler = BernoulliSampler> {
    merger: SignalMerger<S>,
    eliminator: NoiseEliminator,
    min_length: usize,
    opportunistic_merge: bool,
}

impl Pruner<BernoulliSampler> {
    pub fn new(config: PruneConfig) -> Result<Self, TrackingError> {
        let sampler = BernoulliSampler::new(config.merge.sampling_probability);
        Self::with_sampler(config, sampler)
    }
}

impl<S: MergeSampler> Pruner<S> {
    /// Create a pruner whose merger uses a custom sampling policy
    pub fn with_sampler(config: PruneConfig, sampler: S) -> Result<Self, TrackingError> {
        Ok(Self {
            merger: SignalMerger::with_sampler(config.merge, sampler)?,
            eliminator: NoiseEliminator::new(config.noise)?,
            min_length: config.min_length,
            opportunistic_merge: config.opportunistic_merge,
        })
    }

    /// Default maturity threshold
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn merger(&self) -> &SignalMerger<S> {
        &self.merger
    }

    pub fn eliminator(&self) -> &NoiseEliminator {
        &self.eliminator
    }

    /// Prune with the configured maturity threshold
    pub fn prune<R: Rng + ?Sized>(
        &self,
        entities: &mut Vec<TrackedEntity>,
        force: bool,
        rng: &mut R,
    ) -> Result<PruneReport, TrackingError> {
        self.prune_with(entities, self.min_length, force, rng)
    }

    /// Prune with an explicit maturity threshold.
    ///
    /// Does nothing for an empty collection. Forced calls always merge first;
    /// unforced calls merge only when opportunistic merging is enabled (and
    /// the sampler lets the round through).
    pub fn prune_with<R: Rng + ?Sized>(
        &self,
        entities: &mut Vec<TrackedEntity>,
        min_length: usize,
        force: bool,
        rng: &mut R,
    ) -> Result<PruneReport, TrackingError> {
        let mut report = PruneReport::default();
        if entities.is_empty() {
            return Ok(report);
        }

        if force || self.opportunistic_merge {
            report.merge = Some(self.merger.merge_similar(entities, min_length, force, rng)?);
        }
        if entities.is_empty() {
            return Ok(report);
        }
        report.noise = Some(self.eliminator.eliminate_noise(entities, min_length, force)?);

        Ok(report)
    }
}
