//! Duplicate-entity merging
//!
//! The same light is sometimes picked up twice, e.g. when it drifts while
//! dark and reappears outside the association gate. The two entities then
//! carry nearly the same signal from the younger one's first activation on.
//! Such pairs are found by correlating their signal suffixes and folded into
//! a single entity.

use std::collections::BTreeSet;

use rand::Rng;

use crate::common::stats::pearson;
use crate::config::MergeConfig;
use crate::errors::TrackingError;
use crate::traits::{BernoulliSampler, MergeSampler};
use crate::types::{generation_length, EntityId, TrackedEntity};

/// One absorbed duplicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeEvent {
    /// Entity that keeps the merged signal
    pub survivor: EntityId,
    /// Entity scheduled for deletion
    pub absorbed: EntityId,
    /// Frame index the compared suffixes start at
    pub start: usize,
    /// Correlation of the suffixes (`None` if they were bit-identical)
    pub correlation: Option<f64>,
}

/// Outcome of one merge round
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Whether the round ran (unforced rounds are sampled)
    pub executed: bool,
    /// Every merge performed, in scan order
    pub merges: Vec<MergeEvent>,
    /// Entities deleted as duplicates
    pub removed: Vec<TrackedEntity>,
}

/// Detects and merges entities that track the same source
#[derive(Debug, Clone)]
pub struct SignalMerger<S: MergeSampler = BernoulliSampler> {
    config: MergeConfig,
    sampler: S,
}

impl SignalMerger<BernoulliSampler> {
    /// Create a merger whose unforced rounds run with `config.sampling_probability`
    pub fn new(config: MergeConfig) -> Result<Self, TrackingError> {
        let sampler = BernoulliSampler::new(config.sampling_probability);
        Self::with_sampler(config, sampler)
    }
}

impl<S: MergeSampler> SignalMerger<S> {
    /// Create a merger with a custom sampling policy
    pub fn with_sampler(config: MergeConfig, sampler: S) -> Result<Self, TrackingError> {
        config.validate()?;
        Ok(Self { config, sampler })
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Merge near-duplicate entities.
    ///
    /// For every ordered pair `(i, j)` where `j` became active no earlier than
    /// `i` and has at least `min_length` active frames, the suffixes starting
    /// at `j`'s first activation are compared. Identical or strongly
    /// correlated suffixes are summed, jittered and re-binarised into `i`,
    /// and `j` is deleted once the scan is complete.
    pub fn merge_similar<R: Rng + ?Sized>(
        &self,
        entities: &mut Vec<TrackedEntity>,
        min_length: usize,
        force: bool,
        rng: &mut R,
    ) -> Result<MergeReport, TrackingError> {
        let mut report = MergeReport::default();
        if !force && !self.sampler.should_run(rng) {
            return Ok(report);
        }
        report.executed = true;

        let n = generation_length(entities)?;
        let starts = entities
            .iter()
            .map(TrackedEntity::first_active)
            .collect::<Result<Vec<_>, _>>()?;

        let mut doomed = BTreeSet::new();
        for i in 0..entities.len() {
            if doomed.contains(&i) {
                continue;
            }
            for j in 0..entities.len() {
                let start = starts[j];
                if i == j || start < starts[i] || n - start < min_length {
                    continue;
                }

                let a = entities[i].signal.suffix(start);
                let b = entities[j].signal.suffix(start);
                let correlation = if a == b { None } else { pearson(a, b) };
                let duplicate = match correlation {
                    None => a == b,
                    Some(r) => r > self.config.correlation_threshold,
                };
                if !duplicate {
                    continue;
                }

                let merged = self.fuse(a, b, rng);
                entities[i].signal.overwrite_suffix(start, &merged);
                doomed.insert(j);

                log::trace!(
                    "Merging {} into {} from frame {} (r = {:?})",
                    entities[j].id,
                    entities[i].id,
                    start,
                    correlation
                );
                report.merges.push(MergeEvent {
                    survivor: entities[i].id,
                    absorbed: entities[j].id,
                    start,
                    correlation,
                });
            }
        }

        for &idx in doomed.iter().rev() {
            report.removed.push(entities.remove(idx));
        }
        report.removed.reverse();

        if !report.removed.is_empty() {
            log::debug!(
                "Merge round: {} merges, removed {}, kept {}",
                report.merges.len(),
                report.removed.len(),
                entities.len()
            );
        }
        Ok(report)
    }

    /// Noisy OR of two bit windows.
    ///
    /// Positions where both are on stay on, where both are off stay off; where
    /// they disagree a single uniform jitter draw decides for the whole window.
    fn fuse<R: Rng + ?Sized>(&self, a: &[u8], b: &[u8], rng: &mut R) -> Vec<u8> {
        let half = 0.5 * self.config.jitter_width;
        let jitter = rng.gen_range(-half..half);
        a.iter()
            .zip(b)
            .map(|(&x, &y)| u8::from(x as f64 + y as f64 + jitter > self.config.merge_threshold))
            .collect()
    }
}
